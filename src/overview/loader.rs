//! Background loading of overview pages.
//!
//! Uses channel-based communication to bridge async fetches with egui's
//! synchronous update loop. Every result carries the generation of the
//! request that produced it so the renderer can discard stale responses.

use super::query::{HabitatPage, HabitatQuery, QueryError};
use super::source::HabitatSource;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// A request the renderer wants issued.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub generation: u64,
    pub query: HabitatQuery,
}

/// A finished load.
#[derive(Debug)]
pub struct LoadResult {
    pub generation: u64,
    pub result: Result<HabitatPage, QueryError>,
}

pub struct LoadChannel {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
}

impl Default for LoadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Spawns the fetch for `ticket`.
    #[cfg(target_arch = "wasm32")]
    pub fn load<S>(&self, ctx: egui::Context, source: S, ticket: LoadTicket)
    where
        S: HabitatSource + 'static,
    {
        let sender = self.sender.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let LoadTicket { generation, query } = ticket;
            let result = source.fetch(query).await;
            let _ = sender.send(LoadResult { generation, result });
            ctx.request_repaint();
        });
    }

    /// Native fetch on a worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load<S>(&self, ctx: egui::Context, source: S, ticket: LoadTicket)
    where
        S: HabitatSource + Send + 'static,
    {
        let sender = self.sender.clone();

        std::thread::spawn(move || {
            let LoadTicket { generation, query } = ticket;
            let result = pollster::block_on(source.fetch(query));
            let _ = sender.send(LoadResult { generation, result });
            ctx.request_repaint();
        });
    }

    /// Non-blocking check for a completed load.
    pub fn try_recv(&self) -> Option<LoadResult> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::overview::filters::HabitatFilters;
    use crate::overview::sample::SampleSource;
    use std::time::Duration;

    #[test]
    fn test_results_carry_generation() {
        let channel = LoadChannel::new();
        let ticket = LoadTicket {
            generation: 7,
            query: HabitatQuery::for_map(&HabitatFilters::default(), 500),
        };
        channel.load(
            egui::Context::default(),
            SampleSource::with_dummy_data(),
            ticket,
        );

        let result = channel
            .receiver
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(result.generation, 7);
        assert_eq!(result.result.unwrap().entries.len(), 10);
        assert!(channel.try_recv().is_none());
    }
}
