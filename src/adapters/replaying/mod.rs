//! Replaying adapters that serve recorded interactions from cassettes.

pub mod structure_generator;

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;

use crate::cassette::format::Interaction;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::CassetteError;

/// Take the next recorded interaction for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_interaction(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<Interaction, CassetteError> {
    let mut guard = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    guard.next_interaction(port, method)
}

/// A replayed result: the recorded value, the recorded error, or a problem
/// with the cassette itself.
pub(crate) enum Replayed<T, E> {
    Ok(T),
    Err(E),
    Malformed(String),
}

/// Split a replayed output following the Ok/Err JSON convention.
pub(crate) fn replay_result<T, E>(output: serde_json::Value) -> Replayed<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        return match serde_json::from_value(err_val.clone()) {
            Ok(e) => Replayed::Err(e),
            Err(_) => Replayed::Malformed(
                err_val.as_str().map_or_else(|| err_val.to_string(), str::to_string),
            ),
        };
    }
    let ok_val = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    match serde_json::from_value(ok_val) {
        Ok(v) => Replayed::Ok(v),
        Err(e) => Replayed::Malformed(format!("Malformed cassette output: {e}")),
    }
}
