use crate::context::Console;
use crate::utils;
use colored::Colorize;
use dockhand_core::Target;
use dockhand_sync::Direction;

pub async fn handle(console: &Console, src: &str, dst: &str, volume: Option<&str>) -> anyhow::Result<()> {
    // fail before touching the compose file or the fleet
    Direction::classify(src, dst)?;
    let sync = console.volume_sync();

    if let Some(volume) = volume {
        println!();
        println!(
            "{}",
            format!("Synchronizing {} volume from {} to {}", volume, src, dst).cyan()
        );
        sync.sync(volume, src, dst).await?;
        utils::done();
        return Ok(());
    }

    // volumes kept off worker backups still go to a developer machine
    let include_excluded = dst == Target::LOCAL;
    let volumes: Vec<String> = console
        .topology
        .list_volume_names(include_excluded)?
        .into_iter()
        .collect();

    println!();
    println!(
        "{}",
        format!("Synchronizing {} volumes from {} to {}", volumes.len(), src, dst).cyan()
    );
    let pb = utils::progress_bar(volumes.len());
    let mut started = 0;
    let result = sync
        .sync_all(&volumes, src, dst, |volume| {
            pb.set_position(started);
            pb.set_message(utils::label(volume));
            started += 1;
        })
        .await;

    match result {
        Ok(()) => {
            pb.set_position(volumes.len() as u64);
            pb.finish_with_message("Done!".green().to_string());
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}
