//! Main entry point for the stocktake binary
//!
//! Allocates tasks from CSV sheets into a JSON file store, then lets team
//! members start and complete their assignments in order.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use allocator::{
    core::tracker,
    services::{export_allocation_csv, CsvRecordSource, JsonFileStore},
    AllocationConfig, AllocationRun, CompletionPolicy, SpecialOrder, Stocktake, ZoneLockPolicy,
};
use shared::{component_debug, logging, AssignmentKey, Component};

/// Stocktake task allocator and tracker
#[derive(Parser)]
#[command(name = "stocktake")]
#[command(about = "Allocates stocktake layouts to team members and tracks their completion")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Directory holding the current allocation run
    #[arg(long, default_value = "./stocktake-data", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Allocate tasks to the team, replacing any previous run
    Allocate {
        /// Team CSV with name and speed columns
        #[arg(long)]
        team: PathBuf,

        /// Tasks CSV with id, time, priority, difficulty and zone columns
        #[arg(long)]
        tasks: PathBuf,

        /// Shift length in minutes for a baseline-speed member
        #[arg(long)]
        shift_minutes: Option<f64>,

        /// Which special tag is scheduled first
        #[arg(long, value_enum)]
        special_order: Option<SpecialOrder>,

        /// Whether zone locks may move once a zone is exhausted
        #[arg(long, value_enum)]
        zone_lock: Option<ZoneLockPolicy>,

        /// Also write the allocation table to this CSV path
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Start an assignment, given as `<run-id>:<n>` from `show`
    Start {
        assignment: AssignmentKey,
    },

    /// Complete an assignment, given as `<run-id>:<n>` from `show`
    Complete {
        assignment: AssignmentKey,

        /// Allow completing a pending assignment without starting it
        #[arg(long)]
        allow_direct: bool,
    },

    /// Show completion progress for one member or the whole team
    Progress {
        member: Option<String>,
    },

    /// List assignments in allocation order
    Show {
        member: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let config = AllocationConfig::from_env().context("loading configuration")?;
    let store = JsonFileStore::with_base_dir(args.data_dir.clone());

    match args.command {
        Command::Allocate {
            team,
            tasks,
            shift_minutes,
            special_order,
            zone_lock,
            export,
        } => {
            let mut config = config;
            if let Some(minutes) = shift_minutes {
                config = config.with_shift_minutes(minutes);
            }
            if let Some(order) = special_order {
                config = config.with_special_order(order);
            }
            if let Some(policy) = zone_lock {
                config = config.with_zone_lock_policy(policy);
            }
            component_debug!(Component::Cli, "Allocation config: {:?}", config);

            logging::log_startup(Component::Cli, "allocation run");
            let service = Stocktake::new(store, config);
            let source = CsvRecordSource::new(team, tasks);
            let run = match service.allocate(&source).await {
                Ok(run) => run,
                Err(e) => {
                    logging::log_error(Component::Cli, "Allocation", &e);
                    return Err(e.into());
                }
            };

            print_run_summary(&run);
            if let Some(path) = export {
                let paths = export_allocation_csv(&run, &path).await?;
                println!(
                    "Exported {} and {}",
                    paths.allocation.display(),
                    paths.unassigned.display()
                );
            }
            logging::log_success(Component::Cli, "Allocation stored");
        }
        Command::Start { assignment } => {
            let service = Stocktake::new(store, config);
            let updated = service.start(assignment).await?;
            println!(
                "{} started {} ({}, {:.0} min)",
                updated.member_name, updated.task_id, updated.zone, updated.adjusted_time
            );
        }
        Command::Complete {
            assignment,
            allow_direct,
        } => {
            let service = Stocktake::new(store, config);
            let updated = if allow_direct {
                service
                    .complete_with_policy(assignment, CompletionPolicy::AllowDirect)
                    .await?
            } else {
                service.complete(assignment).await?
            };
            println!("{} completed {}", updated.member_name, updated.task_id);

            let progress = service.progress(&updated.member_name).await?;
            println!(
                "{}: {}/{} done ({:.0}%)",
                progress.member,
                progress.completed,
                progress.total,
                progress.ratio() * 100.0
            );
        }
        Command::Progress { member } => {
            let service = Stocktake::new(store, config);
            let rows = match member {
                Some(name) => vec![service.progress(&name).await?],
                None => service.team_progress().await?,
            };
            for p in rows {
                println!(
                    "{:<16} {:>3}/{:<3} {:>5.1}%  ({} started, {} pending)",
                    p.member,
                    p.completed,
                    p.total,
                    p.ratio() * 100.0,
                    p.started,
                    p.pending
                );
            }
        }
        Command::Show { member } => {
            let service = Stocktake::new(store, config);
            let run = service.current_run().await?;
            print_assignments(&run, member.as_deref());
        }
    }

    Ok(())
}

fn print_run_summary(run: &AllocationRun) {
    println!("Run {} ({})", run.run_id, run.created_at.format("%Y-%m-%d %H:%M"));
    println!(
        "Assigned {} of {} tasks, {} unassigned",
        run.assignments.len(),
        run.total_tasks(),
        run.unassigned.len()
    );
    for m in &run.members {
        println!(
            "  {:<16} {:>3} tasks  {:>6.1}/{:<6.1} min  zone {}",
            m.name,
            m.assigned_count,
            m.used_time,
            m.capacity_minutes,
            m.locked_zone.as_deref().unwrap_or("-")
        );
    }
    for t in &run.unassigned {
        println!("  unassigned: {} ({} min, {}, zone {})", t.id, t.time, t.priority, t.zone);
    }
}

fn print_assignments(run: &AllocationRun, member: Option<&str>) {
    for a in run
        .assignments
        .iter()
        .filter(|a| member.map_or(true, |m| a.member_name == m))
    {
        let marker = if !a.is_completed() && !tracker::is_unlocked(run, a) {
            "  (locked until previous is done)"
        } else {
            ""
        };
        println!(
            "{:<40} {:<16} {:<12} {:<10} {:<7} d{} {:>6.1} min  {}{}",
            run.key(a.id).to_string(),
            a.member_name,
            a.task_id,
            a.zone,
            a.priority,
            a.difficulty,
            a.adjusted_time,
            a.status.to_string(),
            marker
        );
    }
}
