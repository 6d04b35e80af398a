// SPDX-License-Identifier: MPL-2.0-only

use std::{fmt, time::Duration};

use anyhow::anyhow;
use calloop::{
    timer::{TimeoutAction, Timer},
    LoopHandle, RegistrationToken,
};

/// Handle of a scheduled one-shot callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(RegistrationToken);

/// One-shot deferred callbacks on the calloop event loop.
///
/// Callbacks run on the loop thread with mutable access to the loop data,
/// after the delay and after whatever else is pending in the same dispatch.
pub struct Timers<D: 'static> {
    handle: LoopHandle<'static, D>,
}

impl<D> Clone for Timers<D> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<D> fmt::Debug for Timers<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers").finish_non_exhaustive()
    }
}

impl<D: 'static> Timers<D> {
    pub fn new(handle: LoopHandle<'static, D>) -> Self {
        Self { handle }
    }

    pub fn schedule<F>(&self, delay: Duration, callback: F) -> anyhow::Result<TimerToken>
    where
        F: FnOnce(&mut D) + 'static,
    {
        let mut callback = Some(callback);
        let token = self
            .handle
            .insert_source(Timer::from_duration(delay), move |_, _, data| {
                if let Some(callback) = callback.take() {
                    callback(data);
                }
                TimeoutAction::Drop
            })
            .map_err(|err| anyhow!("Failed to insert timer into event loop: {}", err))?;
        Ok(TimerToken(token))
    }

    /// Cancelling a fired or already cancelled timer does nothing.
    pub fn cancel(&self, token: TimerToken) {
        self.handle.remove(token.0);
    }
}
