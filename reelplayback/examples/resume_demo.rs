// examples/resume_demo.rs
//
// Démo de la reprise : une même cellule affiche une story, est recyclée au
// milieu de la lecture (défilement), puis réaffiche la story — qui repart
// du snap interrompu, les barres précédentes déjà pleines.
//
// Lancement (depuis la racine du workspace) :
//   cargo run --example resume_demo -p reelplayback

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::time::sleep;

use reelmodel::{Snap, Story, StoryId, StoryOwner};
use reelplayback::{PlaybackConfig, StoryHeader, StoryPlayer};
use reelsnaps::{SnapImage, SnapLoader};

/// Chargeur instantané : les images sortent de nulle part
struct InstantLoader;

#[async_trait]
impl SnapLoader for InstantLoader {
    async fn load(&self, url: &str) -> reelsnaps::Result<Arc<SnapImage>> {
        sleep(Duration::from_millis(40)).await;
        Ok(Arc::new(SnapImage::new(url, DynamicImage::new_rgba8(32, 32))))
    }
}

/// Header minimal : seules les barres nous intéressent ici
struct BarsOnlyHeader;

impl StoryHeader for BarsOnlyHeader {
    fn set_owner(&self, name: &str, _picture_url: &str) {
        println!("[header] story de {name}");
    }

    fn set_last_updated_label(&self, _text: &str) {}

    fn create_progress_bars(&self, count: usize) {
        println!("[header] {count} barres vides");
    }

    fn fill_progress_bar(&self, index: usize) {
        println!("[header] barre {index} pleine");
    }

    fn clear_progress_bar(&self, index: usize) {
        println!("[header] barre {index} effacée");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reelplayback=debug".into()),
        )
        .init();

    println!("Starting resume demo...\n");

    // 1. Une story de quatre snaps, 600 ms chacun
    let story = Arc::new(Story::new(
        StoryId::new("resume-story"),
        StoryOwner::new("leo", "https://example.com/leo.png"),
        vec![
            Snap::new("https://example.com/1.jpg", "4h"),
            Snap::new("https://example.com/2.jpg", "3h"),
            Snap::new("https://example.com/3.jpg", "2h"),
            Snap::new("https://example.com/4.jpg", "1h"),
        ],
    ));

    let config = PlaybackConfig::new().with_snap_duration(Duration::from_millis(600));
    let player = StoryPlayer::with_config(Arc::new(InstantLoader), config);
    player.attach_header(Arc::new(BarsOnlyHeader));

    // 2. Premier passage : la lecture démarre au début
    println!("--- premier passage ---");
    player.assign_story(Arc::clone(&story));
    player.will_display(story.last_played_snap_index());

    // 3. L'utilisateur fait défiler la liste au milieu du troisième snap :
    // la cellule sort de l'écran et la position est persistée
    sleep(Duration::from_millis(1500)).await;
    player.did_end_display();
    println!(
        "\n[host] cellule recyclée, lecture interrompue au snap {}\n",
        story.last_played_snap_index()
    );

    // 4. Second passage : la story revient à l'écran et repart du snap
    // interrompu, barres précédentes pleines
    println!("--- second passage ---");
    player.will_display(story.last_played_snap_index());

    // 5. Cette fois la story va au bout
    sleep(Duration::from_millis(2000)).await;
    player.did_end_display();
    println!(
        "\nDone. Resume index persisted: {}",
        story.last_played_snap_index()
    );
}
