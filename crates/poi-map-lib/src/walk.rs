//! Walk tracking during a search: trail path, walked distance and nearby places

use instant::Instant;

use crate::geo_utils;
use crate::model::{LatLng, Poi};

/// Steps shorter than this are GPS jitter
pub const MIN_STEP_M: f64 = 2.5;
pub const NEARBY_RADIUS_M: f64 = 400.0;
pub const NEARBY_LIMIT: usize = 6;

#[derive(Default)]
pub struct WalkTracker {
    started_at: Option<Instant>,
    path: Vec<LatLng>,
    walked_m: f64,
    nearby: Vec<(Poi, f64)>,
}

impl WalkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start walking towards `target`
    pub fn start(&mut self, target: &Poi, all_pois: &[Poi], user: Option<LatLng>) {
        self.started_at = Some(Instant::now());
        self.path.clear();
        self.walked_m = 0.0;
        self.path.extend(user);
        self.nearby = user
            .map(|u| nearby_pois(u, target, all_pois, NEARBY_RADIUS_M, NEARBY_LIMIT))
            .unwrap_or_default();
        tracing::debug!(target = %target.name, nearby = self.nearby.len(), "Walk started");
    }

    /// Record a location fix; ignored when not walking or within jitter distance
    pub fn update(&mut self, location: LatLng) {
        if self.started_at.is_none() {
            return;
        }
        match self.path.last() {
            Some(&last) => {
                let step = geo_utils::distance(last, location);
                if step > MIN_STEP_M {
                    self.walked_m += step;
                    self.path.push(location);
                }
            }
            None => self.path.push(location),
        }
    }

    /// Stop walking; returns when the walk started
    pub fn stop(&mut self) -> Option<Instant> {
        let started = self.started_at.take();
        if started.is_some() {
            tracing::debug!(walked_m = self.walked_m, points = self.path.len(), "Walk stopped");
        }
        started
    }

    pub fn is_walking(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn path(&self) -> &[LatLng] {
        &self.path
    }

    pub fn walked_meters(&self) -> f64 {
        self.walked_m
    }

    /// POIs near the start point with their distance, closest first
    pub fn nearby(&self) -> &[(Poi, f64)] {
        &self.nearby
    }
}

/// POIs within `radius_m` of `origin`, excluding `target`, closest first
pub fn nearby_pois(origin: LatLng, target: &Poi, pois: &[Poi], radius_m: f64, limit: usize) -> Vec<(Poi, f64)> {
    let mut found: Vec<(Poi, f64)> = pois
        .iter()
        .filter(|p| p.id != target.id)
        .map(|p| (p, geo_utils::distance(origin, p.location)))
        .filter(|(_, d)| *d <= radius_m)
        .map(|(p, d)| (p.clone(), d))
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1));
    found.truncate(limit);
    found
}
