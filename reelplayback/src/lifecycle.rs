//! Signal de retour au premier plan
//!
//! L'hôte appelle [`ForegroundNotifier::notify`] quand l'application revient
//! au premier plan ; chaque lecteur à l'écran s'enregistre le temps de son
//! cycle d'affichage et relance alors son snap courant à pleine durée.
//!
//! L'enregistrement est borné par un jeton : [`register`] rend un `u64`,
//! [`unregister`] le reprend, et un double `unregister` est sans effet. Le
//! lecteur rend son jeton au démontage de la cellule (ou à sa destruction),
//! ce qui évite les observateurs fantômes d'un abonnement jamais relâché.
//!
//! [`register`]: ForegroundNotifier::register
//! [`unregister`]: ForegroundNotifier::unregister

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type ForegroundCallback = Arc<dyn Fn() + Send + Sync>;

struct NotifierInner {
    callbacks: RwLock<HashMap<u64, ForegroundCallback>>,
    counter: AtomicU64,
}

/// Diffuseur du signal « application revenue au premier plan »
#[derive(Clone)]
pub struct ForegroundNotifier {
    inner: Arc<NotifierInner>,
}

impl ForegroundNotifier {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                callbacks: RwLock::new(HashMap::new()),
                counter: AtomicU64::new(1),
            }),
        }
    }

    /// Enregistre un callback et retourne son jeton de désinscription
    pub fn register<F>(&self, callback: F) -> u64
    where
        F: Fn() + Send + Sync + 'static,
    {
        let token = self.inner.counter.fetch_add(1, Ordering::Relaxed);
        let mut callbacks = self.inner.callbacks.write().unwrap();
        callbacks.insert(token, Arc::new(callback));
        tracing::debug!(token, "foreground callback registered");
        token
    }

    /// Reprend un jeton ; inconnu ou déjà rendu : sans effet
    pub fn unregister(&self, token: u64) {
        let mut callbacks = self.inner.callbacks.write().unwrap();
        if callbacks.remove(&token).is_none() {
            tracing::debug!(token, "foreground token already released");
        }
    }

    /// Signale le retour au premier plan à tous les inscrits.
    ///
    /// Les callbacks sont invoqués hors verrou : un callback peut librement
    /// s'enregistrer ou se désinscrire pendant la diffusion.
    pub fn notify(&self) {
        let callbacks: Vec<ForegroundCallback> = {
            let callbacks = self.inner.callbacks.read().unwrap();
            callbacks.values().cloned().collect()
        };
        tracing::debug!(listeners = callbacks.len(), "application foregrounded");
        for callback in callbacks {
            callback();
        }
    }

    /// Nombre d'inscrits (diagnostic et tests)
    pub fn registered_count(&self) -> usize {
        self.inner.callbacks.read().unwrap().len()
    }
}

impl Default for ForegroundNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_callback(notifier: &ForegroundNotifier) -> (u64, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let token = notifier.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (token, count)
    }

    #[test]
    fn test_register_and_notify() {
        let notifier = ForegroundNotifier::new();
        let (_token, count) = counting_callback(&notifier);

        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let notifier = ForegroundNotifier::new();
        let (token, count) = counting_callback(&notifier);

        notifier.notify();
        notifier.unregister(token);
        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.registered_count(), 0);
    }

    #[test]
    fn test_double_unregister_is_harmless() {
        let notifier = ForegroundNotifier::new();
        let (token, _count) = counting_callback(&notifier);

        notifier.unregister(token);
        notifier.unregister(token);
        assert_eq!(notifier.registered_count(), 0);
    }

    #[test]
    fn test_multiple_listeners_all_notified() {
        let notifier = ForegroundNotifier::new();
        let (_t1, count1) = counting_callback(&notifier);
        let (_t2, count2) = counting_callback(&notifier);
        assert_eq!(notifier.registered_count(), 2);

        notifier.notify();
        assert_eq!(count1.load(Ordering::SeqCst), 1);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_shares_registry() {
        let notifier = ForegroundNotifier::new();
        let clone = notifier.clone();
        let (_token, count) = counting_callback(&clone);

        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_may_unregister_during_notify() {
        let notifier = ForegroundNotifier::new();
        let inner = notifier.clone();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let token = Arc::new(AtomicU64::new(0));
        let stored = Arc::clone(&token);
        let registered = notifier.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            inner.unregister(stored.load(Ordering::SeqCst));
        });
        token.store(registered, Ordering::SeqCst);

        notifier.notify();
        notifier.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.registered_count(), 0);
    }
}
