//! Serves recorded interactions back in call order.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use super::format::{Cassette, Interaction};
use super::CassetteError;

/// Per port/method FIFO of recorded interactions.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
    served: HashMap<(String, String), usize>,
}

impl CassetteReplayer {
    /// Queue every interaction of `cassette`, ordered by `seq`.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut interactions = cassette.interactions;
        interactions.sort_by_key(|i| i.seq);

        let mut queues: HashMap<_, VecDeque<_>> = HashMap::new();
        for interaction in interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction);
        }
        Self { queues, served: HashMap::new() }
    }

    /// Load a cassette file and queue its interactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, CassetteError> {
        Cassette::open(path).map(Self::new)
    }

    /// Take the next interaction recorded for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns [`CassetteError::Unrecorded`] if the pair never appears and
    /// [`CassetteError::Exhausted`] once its queue is empty.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<Interaction, CassetteError> {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            return Err(CassetteError::Unrecorded {
                port: key.0,
                method: key.1,
                available: available.join(", "),
            });
        };

        let served = self.served.entry(key).or_insert(0);
        match queue.pop_front() {
            Some(interaction) => {
                *served += 1;
                Ok(interaction)
            }
            None => Err(CassetteError::Exhausted {
                port: port.to_string(),
                method: method.to_string(),
                served: *served,
            }),
        }
    }
}
