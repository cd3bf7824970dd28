//! Compte à rebours suspendable d'un snap
//!
//! Chaque snap affiché possède son propre [`ProgressTimer`] : un compte à
//! rebours à tir unique qui invoque son callback quand le temps actif cumulé
//! atteint la durée demandée. Les intervalles passés en pause ne comptent
//! pas.
//!
//! Le décompte s'appuie sur une tâche tokio endormie sur [`tokio::time`], ce
//! qui permet aux tests de piloter l'horloge avec `start_paused` et
//! `tokio::time::advance`. Si une pause arrive exactement sur l'échéance,
//! la pause gagne : le reliquat (éventuellement nul) sera consommé à la
//! reprise.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Callback de complétion, consommé au premier tir
type CompletionCallback = Box<dyn FnOnce() + Send>;

/// État partagé entre les poignées du minuteur et sa tâche de réveil
struct TimerState {
    /// Durée totale demandée à l'armement
    total: Duration,
    /// Temps actif restant (figé pendant la pause)
    remaining: Duration,
    /// Échéance de la tranche en cours (None en pause ou après le tir)
    deadline: Option<Instant>,
    paused: bool,
    completed: bool,
    cancelled: bool,
    /// Identifiant de la tranche armée. Un réveil porteur d'un identifiant
    /// périmé est ignoré, c'est ce qui fait gagner la pause sur l'échéance.
    run_id: u64,
    callback: Option<CompletionCallback>,
    task: Option<JoinHandle<()>>,
}

/// Compte à rebours à tir unique, suspendable et annulable.
///
/// Le callback est invoqué au plus une fois, quand le temps actif cumulé
/// (pauses exclues) atteint la durée initiale. `pause` et `resume` sont
/// idempotents et sans effet sur un minuteur terminé ou annulé. Doit être
/// créé depuis un contexte tokio.
pub struct ProgressTimer {
    state: Arc<Mutex<TimerState>>,
}

impl ProgressTimer {
    /// Arme un minuteur qui invoquera `on_complete` après `duration` de
    /// temps actif
    pub fn start<F>(duration: Duration, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        // Le callback est en place avant que la tâche de réveil n'existe :
        // une durée nulle peut tirer dès le premier tour de l'ordonnanceur
        let state = Arc::new(Mutex::new(TimerState {
            total: duration,
            remaining: duration,
            deadline: Some(Instant::now() + duration),
            paused: false,
            completed: false,
            cancelled: false,
            run_id: 0,
            callback: Some(Box::new(on_complete)),
            task: None,
        }));

        let task = Self::arm(Arc::clone(&state), duration, 0);
        state.lock().unwrap().task = Some(task);

        Self { state }
    }

    /// Tâche de réveil d'une tranche : dort puis tente le tir
    fn arm(state: Arc<Mutex<TimerState>>, remaining: Duration, run_id: u64) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(remaining).await;

            // Le callback est extrait sous le verrou mais invoqué hors
            // verrou : il rentre dans le lecteur, qui peut à son tour
            // toucher ce minuteur
            let callback = {
                let mut state = state.lock().unwrap();
                if state.run_id != run_id || state.paused || state.completed || state.cancelled {
                    // Tranche périmée : une pause ou une annulation est
                    // passée avant le réveil
                    return;
                }
                state.completed = true;
                state.remaining = Duration::ZERO;
                state.deadline = None;
                state.callback.take()
            };

            if let Some(callback) = callback {
                callback();
            }
        })
    }

    /// Fige le temps restant ; sans effet si déjà en pause, terminé ou annulé
    pub fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if state.paused || state.completed || state.cancelled {
            return;
        }
        state.run_id += 1;
        state.paused = true;
        state.remaining = state
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO);
        state.deadline = None;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    /// Reprend le décompte pour le temps restant ; sans effet si non suspendu
    pub fn resume(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.paused || state.completed || state.cancelled {
            return;
        }
        state.paused = false;
        state.run_id += 1;
        let remaining = state.remaining;
        state.deadline = Some(Instant::now() + remaining);
        // Un reliquat nul (pause arrivée pile sur l'échéance) tire dès le
        // prochain tour de l'ordonnanceur
        state.task = Some(Self::arm(Arc::clone(&self.state), remaining, state.run_id));
    }

    /// Écarte définitivement le minuteur ; le callback ne sera jamais invoqué
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if state.completed || state.cancelled {
            return;
        }
        state.cancelled = true;
        state.run_id += 1;
        state.callback = None;
        state.deadline = None;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    pub fn is_completed(&self) -> bool {
        self.state.lock().unwrap().completed
    }

    /// Durée totale demandée à l'armement
    pub fn total(&self) -> Duration {
        self.state.lock().unwrap().total
    }

    /// Temps actif restant avant le tir
    pub fn remaining(&self) -> Duration {
        let state = self.state.lock().unwrap();
        match state.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => state.remaining,
        }
    }
}

impl Drop for ProgressTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
