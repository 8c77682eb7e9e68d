use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{Channel, ChannelSource, LiveStatus};
use crate::errors::TvError;

pub const PROGRAMS: [&str; 8] = [
    "Berita Utama",
    "Drama Melayu",
    "Sukan Live",
    "Hiburan Malam",
    "Rancangan Agama",
    "Filem Terkini",
    "Berita Sukan",
    "Hiburan Keluarga",
];

/// Probability that a channel is reported live
pub const LIVE_PROBABILITY: f64 = 0.7;
pub const MIN_VIEWERS: u32 = 1_000;
pub const MAX_VIEWERS: u32 = 11_000;

/// Supplies the derived display fields for a freshly loaded channel.
pub trait LiveStatusSource {
    fn status_for(&mut self, channel: &Channel) -> LiveStatus;
}

/// Simulated live feed backed by an RNG. Seed it for reproducible output.
pub struct RandomLiveStatus {
    rng: StdRng,
}

impl RandomLiveStatus {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLiveStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStatusSource for RandomLiveStatus {
    fn status_for(&mut self, _channel: &Channel) -> LiveStatus {
        let is_live = self.rng.gen_bool(LIVE_PROBABILITY);
        let viewers = self.rng.gen_range(MIN_VIEWERS..MAX_VIEWERS);
        let current_program = PROGRAMS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(PROGRAMS[0])
            .to_string();
        LiveStatus {
            is_live,
            viewers,
            current_program,
        }
    }
}

/// Loaded channel list plus its id lookup. Both are only ever swapped
/// together, so readers never see one without the other.
#[derive(Debug, Default, Clone)]
pub struct ChannelStore {
    channels: Vec<Arc<Channel>>,
    by_id: HashMap<String, Arc<Channel>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> &[Arc<Channel>] {
        &self.channels
    }

    pub fn get(&self, id: &str) -> Option<Arc<Channel>> {
        self.by_id.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_live()).count()
    }

    /// Fetch from `source` and swap in the result. On failure the store is
    /// left empty and the error handed back.
    pub async fn load<C: ChannelSource>(
        &mut self,
        source: &C,
        live: &mut dyn LiveStatusSource,
    ) -> Result<(), TvError> {
        let result = source.fetch_channels().await;
        self.apply(result, live)
    }

    /// Apply the outcome of a fetch that ran elsewhere.
    pub fn apply(
        &mut self,
        result: Result<Vec<Channel>, TvError>,
        live: &mut dyn LiveStatusSource,
    ) -> Result<(), TvError> {
        match result {
            Ok(channels) => {
                self.replace(channels, live);
                info!(count = self.len(), live = self.live_count(), "channels loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load channels");
                self.reset();
                Err(e)
            }
        }
    }

    /// Replace the list, deriving live fields for every channel. Later
    /// entries reusing an id already seen are dropped.
    pub fn replace(&mut self, raw: Vec<Channel>, live: &mut dyn LiveStatusSource) {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut channels = Vec::with_capacity(raw.len());
        for mut channel in raw {
            if !seen.insert(channel.id.clone()) {
                warn!(id = %channel.id, "duplicate channel id dropped");
                continue;
            }
            channel.status = live.status_for(&channel);
            channels.push(Arc::new(channel));
        }

        let by_id = channels
            .iter()
            .map(|c| (c.id.clone(), Arc::clone(c)))
            .collect();

        self.channels = channels;
        self.by_id = by_id;
    }

    pub fn reset(&mut self) {
        self.channels = Vec::new();
        self.by_id = HashMap::new();
    }
}
