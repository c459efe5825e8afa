use crate::core::errors::{Result, RouteError, NO_ROUTE_FOUND};
use crate::core::options::LoopOptions;
use crate::core::types::{GeneratedLoopCore, GeoPoint, Route, Waypoint};
use crate::routing::DirectionsProvider;
use crate::spatial::geometry::offset_point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use uuid::Uuid;

/// Shortest loop the generator will attempt.
pub const MIN_TARGET_DISTANCE_KM: f64 = 0.1;

/// Outcome of a loop search. When `tolerance_met` is false the route is the
/// closest attempt, and callers can warn using `distance_error_fraction`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopGeneration {
    pub route: Route,
    pub seed: u64,
    pub attempts: usize,
    pub tolerance_met: bool,
}

impl LoopGeneration {
    pub fn achieved_km(&self) -> f64 {
        self.route.distance_km
    }

    pub fn target_km(&self) -> f64 {
        self.route
            .target_distance_km
            .unwrap_or(self.route.distance_km)
    }

    /// Signed relative error; positive when the loop came out long.
    pub fn distance_error_fraction(&self) -> f64 {
        (self.achieved_km() - self.target_km()) / self.target_km()
    }
}

impl Route {
    pub fn from_loop_core(start: &GeoPoint, core: GeneratedLoopCore, target_km: f64) -> Route {
        Route {
            id: Uuid::new_v4().to_string(),
            start: *start,
            end: *start,
            waypoints: core.waypoints,
            polyline: core.polyline,
            distance_km: core.distance_km,
            estimated_duration_sec: core.duration_sec,
            is_loop: true,
            target_distance_km: Some(target_km),
            name: None,
        }
    }
}

/// Seed-derived shape of the waypoint ring, independent of its radius so
/// that corrections between attempts only rescale it.
#[derive(Debug, Clone, PartialEq)]
struct RingShape {
    /// (bearing in radians, radius multiplier) per waypoint, in angular order.
    spokes: Vec<(f64, f64)>,
}

impl RingShape {
    fn from_seed(seed: u64, waypoint_count: usize, jitter_fraction: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let rotation = rng.random::<f64>() * TAU;
        let step = TAU / waypoint_count as f64;

        let spokes = (0..waypoint_count)
            .map(|i| {
                let angle_jitter = rng.random_range(-1.0..=1.0) * jitter_fraction * step / 2.0;
                let radius_jitter = rng.random_range(-1.0..=1.0) * jitter_fraction;
                (rotation + i as f64 * step + angle_jitter, 1.0 + radius_jitter)
            })
            .collect();

        RingShape { spokes }
    }

    fn place(&self, start: &GeoPoint, radius_km: f64) -> Vec<GeoPoint> {
        self.spokes
            .iter()
            .map(|&(bearing, factor)| {
                let distance = radius_km * factor;
                offset_point(start, distance * bearing.cos(), distance * bearing.sin())
            })
            .collect()
    }
}

struct Attempt {
    core: GeneratedLoopCore,
    error_km: f64,
}

pub struct LoopRouteGenerator<P> {
    provider: P,
    options: LoopOptions,
}

impl<P: DirectionsProvider> LoopRouteGenerator<P> {
    pub fn new(provider: P, options: LoopOptions) -> Result<Self> {
        options.validate()?;
        Ok(LoopRouteGenerator { provider, options })
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    /// Generates a loop starting and ending at `start` close to
    /// `target_km`, packaged as a route.
    pub async fn generate(&self, start: &GeoPoint, target_km: f64) -> Result<LoopGeneration> {
        let (core, attempts, tolerance_met) = self.search(start, target_km).await?;
        let seed = core.seed;

        Ok(LoopGeneration {
            route: Route::from_loop_core(start, core, target_km),
            seed,
            attempts,
            tolerance_met,
        })
    }

    /// Runs the radius correction search. Attempts are strictly sequential,
    /// each one's radius depending on the previous measured distance.
    ///
    /// Returns the first attempt within tolerance, otherwise the attempt
    /// with the smallest absolute distance error. Fails with
    /// `RoutingUnavailable` only when no attempt produced a usable path.
    pub async fn search(
        &self,
        start: &GeoPoint,
        target_km: f64,
    ) -> Result<(GeneratedLoopCore, usize, bool)> {
        start.validate()?;
        if !target_km.is_finite() || target_km < MIN_TARGET_DISTANCE_KM {
            return Err(RouteError::InvalidInput(format!(
                "target distance must be at least {} km, got {}",
                MIN_TARGET_DISTANCE_KM, target_km
            )));
        }

        let seed = self
            .options
            .seed
            .unwrap_or_else(|| u64::from(rand::random::<u32>()));
        let shape = RingShape::from_seed(
            seed,
            self.options.waypoint_count,
            self.options.jitter_fraction,
        );
        let base_radius_km = target_km / self.options.road_efficiency_factor / TAU;
        let accept_km = target_km * self.options.tolerance;

        let mut multiplier = 1.0;
        let mut best: Option<Attempt> = None;
        let mut last_failure: Option<String> = None;
        let mut attempts_made = 0;

        for attempt in 1..=self.options.max_attempts {
            attempts_made = attempt;
            let radius_km = base_radius_km * multiplier;
            let ring = shape.place(start, radius_km);

            let path = match self.provider.get_path(start, start, &ring).await {
                Ok(path) if path.is_usable() => path,
                Ok(_) => {
                    log::warn!(
                        "loop attempt {}/{} (seed {}): provider returned no usable path",
                        attempt,
                        self.options.max_attempts,
                        seed
                    );
                    last_failure = Some(NO_ROUTE_FOUND.to_string());
                    continue;
                }
                Err(e) if e.is_retryable() => {
                    log::warn!(
                        "loop attempt {}/{} (seed {}) failed: {}",
                        attempt,
                        self.options.max_attempts,
                        seed,
                        e
                    );
                    last_failure = Some(e.provider_message());
                    continue;
                }
                Err(e) if best.is_none() => return Err(e),
                Err(e) => {
                    log::warn!(
                        "loop attempt {}/{} (seed {}) rejected: {}; keeping closest attempt",
                        attempt,
                        self.options.max_attempts,
                        seed,
                        e
                    );
                    break;
                }
            };

            let actual_km = path.distance_km();
            let error_km = (actual_km - target_km).abs();

            log::debug!(
                "loop attempt {}/{} (seed {}): radius {:.3} km -> {:.3} km (target {:.3} km)",
                attempt,
                self.options.max_attempts,
                seed,
                radius_km,
                actual_km,
                target_km
            );

            let core = GeneratedLoopCore {
                waypoints: ring
                    .into_iter()
                    .enumerate()
                    .map(|(order, point)| Waypoint::new(point, order))
                    .collect(),
                distance_km: actual_km,
                duration_sec: path.duration_sec(),
                polyline: path.polyline,
                seed,
            };

            if error_km <= accept_km {
                return Ok((core, attempt, true));
            }

            if best.as_ref().map_or(true, |b| error_km < b.error_km) {
                best = Some(Attempt { core, error_km });
            }

            if actual_km > 0.0 {
                multiplier *= target_km / actual_km;
            }
        }

        match best {
            Some(best) => {
                log::info!(
                    "loop search stopped after {} attempts (seed {}); closest is {:.3} km for target {:.3} km",
                    attempts_made,
                    seed,
                    best.core.distance_km,
                    target_km
                );
                Ok((best.core, attempts_made, false))
            }
            None => Err(RouteError::RoutingUnavailable(
                last_failure.unwrap_or_else(|| NO_ROUTE_FOUND.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{DirectionsPath, PathSegment};
    use crate::spatial::geometry::haversine_distance_km;
    use std::sync::Mutex;

    /// Reports whatever distances it was primed with, recording each ring.
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<f64>>>,
        rings: Mutex<Vec<Vec<GeoPoint>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<f64>>) -> Self {
            ScriptedProvider {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                rings: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.rings.lock().unwrap().len()
        }
    }

    impl DirectionsProvider for ScriptedProvider {
        async fn get_path(
            &self,
            origin: &GeoPoint,
            destination: &GeoPoint,
            waypoints: &[GeoPoint],
        ) -> Result<DirectionsPath> {
            self.rings.lock().unwrap().push(waypoints.to_vec());
            let distance_km = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(RouteError::ProviderError("script exhausted".into())))?;

            let mut polyline = vec![*origin];
            polyline.extend_from_slice(waypoints);
            polyline.push(*destination);
            Ok(DirectionsPath {
                polyline,
                segments: vec![PathSegment {
                    distance_km,
                    duration_sec: (distance_km * 360.0) as u64,
                }],
            })
        }
    }

    fn start() -> GeoPoint {
        GeoPoint::new(51.5007, -0.1246)
    }

    fn options(seed: u64) -> LoopOptions {
        LoopOptions {
            seed: Some(seed),
            ..LoopOptions::default()
        }
    }

    fn mean_radius(ring: &[GeoPoint]) -> f64 {
        ring.iter()
            .map(|p| haversine_distance_km(&start(), p))
            .sum::<f64>()
            / ring.len() as f64
    }

    #[test]
    fn ring_shape_is_reproducible_from_seed() {
        let a = RingShape::from_seed(7, 6, 0.2);
        let b = RingShape::from_seed(7, 6, 0.2);
        let c = RingShape::from_seed(8, 6, 0.2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ring_spokes_stay_in_angular_order() {
        let shape = RingShape::from_seed(99, 6, 0.2);
        let step = TAU / 6.0;
        for pair in shape.spokes.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(gap > step * 0.8 - 1e-9 && gap < step * 1.2 + 1e-9);
        }
        for &(_, factor) in &shape.spokes {
            assert!((0.8..=1.2).contains(&factor));
        }
    }

    #[test]
    fn ring_without_jitter_is_a_circle() {
        let ring = RingShape::from_seed(3, 8, 0.0).place(&start(), 2.0);
        assert_eq!(ring.len(), 8);
        for p in &ring {
            let d = haversine_distance_km(&start(), p);
            assert!((d - 2.0).abs() < 0.02, "got {d}");
        }
    }

    #[tokio::test]
    async fn accepts_first_attempt_within_tolerance() {
        let provider = ScriptedProvider::new(vec![Ok(5.3)]);
        let generator = LoopRouteGenerator::new(&provider, options(1)).unwrap();

        let result = generator.generate(&start(), 5.0).await.unwrap();
        assert!(result.tolerance_met);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.seed, 1);
        assert!(result.route.is_loop);
        assert!(result.route.start.same_position(&result.route.end));
        assert_eq!(result.route.target_distance_km, Some(5.0));
        assert_eq!(result.route.waypoints.len(), 6);
        assert!((result.achieved_km() - 5.3).abs() < 1e-12);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn rescales_radius_by_target_over_actual() {
        let provider = ScriptedProvider::new(vec![Ok(10.0), Ok(5.1)]);
        let generator = LoopRouteGenerator::new(&provider, options(11)).unwrap();

        let result = generator.generate(&start(), 5.0).await.unwrap();
        assert_eq!(result.attempts, 2);

        let rings = provider.rings.lock().unwrap();
        let ratio = mean_radius(&rings[1]) / mean_radius(&rings[0]);
        assert!((ratio - 0.5).abs() < 0.01, "radius ratio {ratio}");
    }

    #[tokio::test]
    async fn returns_closest_attempt_when_tolerance_never_met() {
        let provider = ScriptedProvider::new(vec![Ok(8.0), Ok(3.0), Ok(6.0), Ok(2.0)]);
        let generator = LoopRouteGenerator::new(&provider, options(5)).unwrap();

        let result = generator.generate(&start(), 5.0).await.unwrap();
        assert!(!result.tolerance_met);
        assert_eq!(result.attempts, 4);
        assert!((result.achieved_km() - 6.0).abs() < 1e-12);
        assert!((result.distance_error_fraction() - 0.2).abs() < 1e-12);
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn absorbs_failed_attempts() {
        let provider = ScriptedProvider::new(vec![
            Err(RouteError::ProviderError("OVER_QUERY_LIMIT".into())),
            Ok(4.8),
        ]);
        let generator = LoopRouteGenerator::new(&provider, options(2)).unwrap();

        let result = generator.generate(&start(), 5.0).await.unwrap();
        assert!(result.tolerance_met);
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn rejected_attempt_keeps_earlier_path() {
        let provider = ScriptedProvider::new(vec![
            Ok(10.0),
            Err(RouteError::invalid("waypoint rejected by provider")),
            Ok(5.0),
        ]);
        let generator = LoopRouteGenerator::new(&provider, options(1)).unwrap();

        let result = generator.generate(&start(), 5.0).await.unwrap();
        assert!(!result.tolerance_met);
        assert_eq!(result.attempts, 2);
        assert!((result.achieved_km() - 10.0).abs() < 1e-12);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn rejected_first_attempt_fails() {
        let provider = ScriptedProvider::new(vec![Err(RouteError::invalid("bad waypoint"))]);
        let generator = LoopRouteGenerator::new(&provider, options(1)).unwrap();

        assert!(matches!(
            generator.generate(&start(), 5.0).await,
            Err(RouteError::InvalidInput(_))
        ));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn fails_only_when_every_attempt_fails() {
        let provider = ScriptedProvider::new(vec![
            Err(RouteError::ProviderError("ZERO_RESULTS".into())),
            Err(RouteError::ProviderError("ZERO_RESULTS".into())),
            Err(RouteError::ProviderError("ZERO_RESULTS".into())),
            Err(RouteError::ProviderError("ZERO_RESULTS".into())),
        ]);
        let generator = LoopRouteGenerator::new(&provider, options(2)).unwrap();

        match generator.generate(&start(), 5.0).await {
            Err(RouteError::RoutingUnavailable(msg)) => assert_eq!(msg, "ZERO_RESULTS"),
            other => panic!("expected RoutingUnavailable, got {:?}", other),
        }
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn same_seed_same_waypoints() {
        let first = ScriptedProvider::new(vec![Ok(5.0)]);
        let second = ScriptedProvider::new(vec![Ok(5.0)]);

        let a = LoopRouteGenerator::new(&first, options(42))
            .unwrap()
            .generate(&start(), 5.0)
            .await
            .unwrap();
        let b = LoopRouteGenerator::new(&second, options(42))
            .unwrap()
            .generate(&start(), 5.0)
            .await
            .unwrap();

        let points = |g: &LoopGeneration| -> Vec<GeoPoint> {
            g.route.waypoints.iter().map(|w| w.point).collect()
        };
        assert_eq!(points(&a), points(&b));
        assert_ne!(a.route.id, b.route.id);
    }

    #[tokio::test]
    async fn rejects_short_target_and_bad_start() {
        let provider = ScriptedProvider::new(vec![]);
        let generator = LoopRouteGenerator::new(&provider, options(1)).unwrap();

        assert!(matches!(
            generator.generate(&start(), 0.05).await,
            Err(RouteError::InvalidInput(_))
        ));
        assert!(matches!(
            generator.generate(&GeoPoint::new(f64::NAN, 0.0), 5.0).await,
            Err(RouteError::InvalidInput(_))
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn rejects_invalid_options() {
        let provider = ScriptedProvider::new(vec![]);
        let bad = LoopOptions {
            max_attempts: 0,
            ..LoopOptions::default()
        };
        assert!(LoopRouteGenerator::new(&provider, bad).is_err());
    }
}
