// demos/history.rs
//
// Shows the checked out tip, the working directory changes and the first
// few hundred commits of a local repository.
//
// Run with `RUST_LOG=gitstore=debug` to see every git invocation.

use std::error::Error;
use std::path::Path;

use gitstore::models::RepositoryTip;
use gitstore::repository::Repository;
use gitstore::{GitCli, GitStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <repository_path> [min_commits]", args[0]);
        return Ok(());
    }
    let min_commits = match args.get(2) {
        Some(n) => n.parse()?,
        None => 250,
    };

    let git = GitCli::from_env();
    let Some(root) = Repository::top_level_working_directory(&git, Path::new(&args[1])).await? else {
        eprintln!("Not a git repository: {}", args[1]);
        return Ok(());
    };

    let store = GitStore::new(&root);
    store.refresh().await?;

    println!("Repository: {}", store.local_path().display());
    match store.status().tip() {
        RepositoryTip::Valid { branch } => {
            print!("On branch {} at {}", branch.name, &branch.tip.sha[..7]);
            if let Some(upstream) = &branch.upstream {
                print!(" tracking {}", upstream);
            }
            println!();
        }
        RepositoryTip::Unborn { reference } => println!("No commits yet on {}", reference),
        RepositoryTip::Detached { commit_id } => println!("HEAD detached at {}", commit_id),
        RepositoryTip::Unknown => println!("Unknown HEAD"),
    }

    if let Some(status) = store.status().status() {
        if let Some(ab) = status.branch_ahead_behind {
            println!("Ahead {}, behind {}", ab.ahead, ab.behind);
        }
        for entry in &status.entries {
            match &entry.old_path {
                Some(old) => println!("  {} {} -> {}", entry.status_code, old, entry.path),
                None => println!("  {} {}", entry.status_code, entry.path),
            }
        }
    }

    let history = store.history();
    history.load_next_batch(Some(min_commits)).await?;
    println!(
        "\nLoaded {} of {} commits:",
        history.loaded_count(),
        history.total_count()
    );
    for commit in history.commits(0..history.loaded_count()) {
        println!(
            "{} {:<20} {}",
            &commit.sha[..7],
            commit.author.name,
            commit.summary
        );
    }

    Ok(())
}
