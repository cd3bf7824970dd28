// examples/playback_demo.rs
//
// Démo du moteur de lecture de story, sans réseau ni interface :
//   - un chargeur scripté fabrique les images en mémoire
//   - un header console affiche les ordres reçus (barres, étiquettes)
//   - le script déroule lecture, pause, reprise et retour au premier plan
//
// Lancement (depuis la racine du workspace) :
//   cargo run --example playback_demo -p reelplayback
//
// Les durées sont raccourcies (800 ms par snap) pour garder la démo vive.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::time::sleep;

use reelmodel::{Snap, Story, StoryId, StoryOwner};
use reelplayback::{ForegroundNotifier, PlaybackConfig, StoryEvent, StoryHeader, StoryPlayer};
use reelsnaps::{SnapImage, SnapLoader};

/// Chargeur de démonstration : fabrique une image 64x64 après un court délai
struct DemoLoader;

#[async_trait]
impl SnapLoader for DemoLoader {
    async fn load(&self, url: &str) -> reelsnaps::Result<Arc<SnapImage>> {
        // Simule le réseau
        sleep(Duration::from_millis(120)).await;
        Ok(Arc::new(SnapImage::new(url, DynamicImage::new_rgba8(64, 64))))
    }
}

/// Header console : imprime chaque ordre reçu du moteur
struct ConsoleHeader;

impl StoryHeader for ConsoleHeader {
    fn set_owner(&self, name: &str, _picture_url: &str) {
        println!("[header] story de {name}");
    }

    fn set_last_updated_label(&self, text: &str) {
        println!("[header] snap publié il y a {text}");
    }

    fn create_progress_bars(&self, count: usize) {
        println!("[header] {count} barres de progression");
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

    println!("Starting story playback demo...\n");

    // 1. Une story de trois snaps
    let story = Arc::new(Story::new(
        StoryId::new("demo-story"),
        StoryOwner::new("ana", "https://example.com/ana.png"),
        vec![
            Snap::new("https://example.com/1.jpg", "3h"),
            Snap::new("https://example.com/2.jpg", "2h"),
            Snap::new("https://example.com/3.jpg", "1h"),
        ],
    ));

    // 2. Le lecteur, configuré court pour la démo
    let config = PlaybackConfig::new().with_snap_duration(Duration::from_millis(800));
    let player = StoryPlayer::with_config(Arc::new(DemoLoader), config);
    player.attach_header(Arc::new(ConsoleHeader));

    let notifier = ForegroundNotifier::new();
    player.attach_foreground_notifier(&notifier);

    // 3. Les évènements remontés à l'hôte
    player.register_callback(|event| match event {
        StoryEvent::PreviewCompleted { story_id } => {
            println!("[host] story {story_id} terminée");
        }
        StoryEvent::CloseRequested { story_id } => {
            println!("[host] fermeture demandée pendant {story_id}");
        }
    });

    // 4. La cellule arrive à l'écran
    player.assign_story(Arc::clone(&story));
    player.will_display(story.last_played_snap_index());

    // 5. Pause utilisateur au milieu du premier snap
    sleep(Duration::from_millis(400)).await;
    println!("\n[user] pression longue...");
    player.long_press_begin();
    sleep(Duration::from_millis(600)).await;
    println!("[user] ...relâchée\n");
    player.long_press_end();

    // 6. Retour au premier plan pendant le deuxième snap : il repart à
    // pleine durée
    sleep(Duration::from_millis(1000)).await;
    println!("\n[system] application au premier plan\n");
    notifier.notify();

    // 7. Laisser la story se terminer puis démonter la cellule
    sleep(Duration::from_secs(3)).await;
    player.did_end_display();
    println!(
        "\nDone. Resume index persisted: {}",
        story.last_played_snap_index()
    );
}
