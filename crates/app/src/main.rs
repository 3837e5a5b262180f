mod config;
mod logging;

use std::io::{self, Write};

use clap::Parser;
use services::{AppServices, Clock, SaveStatus};
use trail_core::model::{NodeId, RoadmapId};

use config::{Cli, Command, normalize_sqlite_url, prepare_sqlite_file};
use logging::{Verbosity, init_logging};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn run(cli: Cli) -> AppResult<()> {
    // Open + migrate SQLite here so core/services stay free of filesystem concerns.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let services =
        AppServices::new_sqlite(&db_url, Clock::system(), cli.catalog_url.as_deref()).await?;
    tracing::debug!(db = %db_url, "storage ready");

    let mut out = io::stdout().lock();
    execute(&services, cli.command, &mut out).await
}

async fn execute(services: &AppServices, command: Command, out: &mut impl Write) -> AppResult<()> {
    let store = services.store();
    let catalog = services.catalog();

    match command {
        Command::Roadmaps => {
            for roadmap in catalog.list_roadmaps().await {
                writeln!(out, "{}\t{}", roadmap.id, roadmap.title)?;
            }
        }
        Command::Progress { roadmap } => {
            let roadmap = RoadmapId::new(roadmap)?;
            let progress = store.get_progress(&roadmap).await;
            let nodes = catalog.list_nodes(&roadmap).await;
            if nodes.is_empty() {
                for (node, status) in progress.iter() {
                    writeln!(out, "{node}\t{status}")?;
                }
            } else {
                for node in &nodes {
                    let status = progress.status_of(&node.id);
                    writeln!(out, "{}\t{status}\t{}", node.id, node.title)?;
                }
            }
            writeln!(out, "completed: {}", progress.completed_count())?;
        }
        Command::Mark {
            roadmap,
            node,
            status,
        } => {
            let roadmap = RoadmapId::new(roadmap)?;
            let node = NodeId::new(node)?;
            let saved = store.update_node_progress(&node, &status, &roadmap).await?;
            report(out, &saved)?;
        }
        Command::Note { node, content } => {
            let node = NodeId::new(node)?;
            match content {
                Some(content) => {
                    let saved = store.set_note(&node, content).await?;
                    report(out, &saved)?;
                }
                None => match store.get_note(&node).await {
                    Some(note) => {
                        writeln!(out, "# {} ({})", node, note.updated_at().to_rfc3339())?;
                        writeln!(out, "{}", note.content())?;
                    }
                    None => writeln!(out, "no note for {node}")?,
                },
            }
        }
        Command::Notes => {
            let notes = store.get_all_notes().await;
            for (node, note) in notes.recent_first() {
                let first_line = note.content().lines().next().unwrap_or_default();
                writeln!(out, "{node}\t{}\t{first_line}", note.updated_at().to_rfc3339())?;
            }
        }
        Command::Position {
            roadmap,
            node,
            scroll,
        } => match (roadmap, node) {
            (Some(roadmap), Some(node)) => {
                let roadmap = RoadmapId::new(roadmap)?;
                let node = NodeId::new(node)?;
                let saved = match scroll {
                    Some(scroll) => store.save_position(&roadmap, &node, Some(scroll)).await,
                    None => store.set_current_position(&roadmap, &node).await,
                };
                report(out, &saved)?;
            }
            (Some(roadmap), None) => {
                let roadmap = RoadmapId::new(roadmap)?;
                match store.get_position(&roadmap).await {
                    Some(trail) => writeln!(
                        out,
                        "{roadmap}\t{}\t{}",
                        trail.node_id(),
                        trail.last_visit().to_rfc3339()
                    )?,
                    None => writeln!(out, "no position in {roadmap}")?,
                }
            }
            _ => match store.get_current_position().await {
                Some(pos) => writeln!(out, "{}\t{}", pos.roadmap_id, pos.node_id)?,
                None => writeln!(out, "no current position")?,
            },
        },
        Command::Resume => match services.journey().resume().await {
            Some((roadmap, node)) => writeln!(out, "{}: {}", roadmap.title, node.title)?,
            None => writeln!(out, "nothing to resume")?,
        },
        Command::Journey => {
            for summary in services.journey().journey().await {
                let next = summary
                    .current_node
                    .as_ref()
                    .map_or("-", |n| n.title.as_str());
                writeln!(
                    out,
                    "{}\t{}/{}\tnext: {next}",
                    summary.roadmap.title, summary.completed_count, summary.total_count
                )?;
            }
        }
        Command::Reset => {
            let saved = store.reset_all().await;
            report(out, &saved)?;
        }
    }
    Ok(())
}

fn report(out: &mut impl Write, saved: &SaveStatus) -> io::Result<()> {
    match saved.warning() {
        None => writeln!(out, "saved"),
        Some(err) => writeln!(out, "warning: change not saved ({err})"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));

    if let Err(err) = run(cli).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_core::model::ProgressStatus;

    async fn run_cmd(services: &AppServices, command: Command) -> String {
        let mut out = Vec::new();
        execute(services, command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn mark_then_progress_shows_status() {
        let services = AppServices::in_memory(Clock::system());
        let mark = Command::Mark {
            roadmap: "git-github".into(),
            node: "git-1".into(),
            status: ProgressStatus::Completed.to_string(),
        };
        assert_eq!(run_cmd(&services, mark).await, "saved\n");

        let shown = run_cmd(
            &services,
            Command::Progress {
                roadmap: "git-github".into(),
            },
        )
        .await;
        assert!(shown.contains("git-1\tcompleted\tWhat is Git?"));
        assert!(shown.ends_with("completed: 1\n"));
    }

    #[tokio::test]
    async fn bogus_status_is_an_error() {
        let services = AppServices::in_memory(Clock::system());
        let mark = Command::Mark {
            roadmap: "git-github".into(),
            node: "git-1".into(),
            status: "done".into(),
        };
        let mut out = Vec::new();
        assert!(execute(&services, mark, &mut out).await.is_err());
    }

    #[tokio::test]
    async fn resume_follows_position() {
        let services = AppServices::in_memory(Clock::system());
        assert_eq!(run_cmd(&services, Command::Resume).await, "nothing to resume\n");

        let position = Command::Position {
            roadmap: Some("git-github".into()),
            node: Some("git-8".into()),
            scroll: None,
        };
        run_cmd(&services, position).await;
        assert_eq!(
            run_cmd(&services, Command::Resume).await,
            "Git & GitHub: Branching Basics\n"
        );
    }
}
