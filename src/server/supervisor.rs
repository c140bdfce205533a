//! # Límite de Conexiones Concurrentes
//! src/server/supervisor.rs
//!
//! Semáforo contador sobre un `Mutex`. El listener pide un [`Permit`] antes
//! de lanzar cada worker, sin esperar: si no hay lugar la conexión se rechaza.
//! El permiso se devuelve cuando el worker lo suelta (drop), aunque el handler
//! haya hecho panic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Slots {
    active: Mutex<usize>,
    max: usize,
}

impl Slots {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // El contador sigue siendo válido aunque otro thread haya hecho panic
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Limita cuántos workers pueden estar atendiendo conexiones a la vez
#[derive(Clone)]
pub struct ConnectionLimiter {
    slots: Arc<Slots>,
}

impl ConnectionLimiter {
    /// `max` se sube a 1 si viene en 0
    pub fn new(max: usize) -> Self {
        Self {
            slots: Arc::new(Slots {
                active: Mutex::new(0),
                max: max.max(1),
            }),
        }
    }

    /// Toma un lugar si hay alguno libre; nunca espera
    pub fn try_acquire(&self) -> Option<Permit> {
        let mut active = self.slots.lock();
        if *active >= self.slots.max {
            return None;
        }
        *active += 1;

        Some(Permit {
            slots: Arc::clone(&self.slots),
        })
    }

    /// Workers activos en este momento
    pub fn active(&self) -> usize {
        *self.slots.lock()
    }

    pub fn max(&self) -> usize {
        self.slots.max
    }
}

impl std::fmt::Debug for ConnectionLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLimiter")
            .field("active", &self.active())
            .field("max", &self.slots.max)
            .finish()
    }
}

/// Lugar ocupado en el limitador
pub struct Permit {
    slots: Arc<Slots>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        let mut active = self.slots.lock();
        *active = active.saturating_sub(1);
    }
}
