use crate::core::errors::{Result, RouteError, NO_ROUTE_FOUND};
use crate::core::options::DirectionsOptions;
use crate::core::types::GeoPoint;
use crate::routing::{DirectionsPath, DirectionsProvider, PathSegment};
use crate::spatial::encoding::decode_polyline;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    overview_polyline: ApiPolyline,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: ApiValue,
    duration: ApiValue,
}

#[derive(Debug, Deserialize)]
struct ApiValue {
    value: f64,
}

/// Directions provider backed by the Google Directions JSON API, or any
/// server speaking the same format.
pub struct GoogleDirectionsProvider {
    client: reqwest::Client,
    options: DirectionsOptions,
}

impl GoogleDirectionsProvider {
    pub fn new(options: DirectionsOptions) -> Result<Self> {
        options.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;
        Ok(GoogleDirectionsProvider { client, options })
    }

    fn query(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        waypoints: &[GeoPoint],
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", format_point(origin)),
            ("destination", format_point(destination)),
            ("mode", self.options.mode.clone()),
        ];
        if !waypoints.is_empty() {
            query.push(("waypoints", format_waypoints(waypoints)));
        }
        if !self.options.api_key.is_empty() {
            query.push(("key", self.options.api_key.clone()));
        }
        query
    }

    async fn fetch(&self, query: &[(&'static str, String)]) -> Result<String> {
        let url = format!(
            "{}/maps/api/directions/json",
            self.options.server.trim_end_matches('/')
        );
        let mut attempts = 0;

        while attempts < self.options.retries {
            let response = self.client.get(&url).query(query).send().await?;

            if response.status().is_success() {
                return Ok(response.text().await?);
            }

            log::warn!(
                "directions request returned {} (attempt {}/{})",
                response.status(),
                attempts + 1,
                self.options.retries
            );
            attempts += 1;
            if attempts < self.options.retries {
                tokio::time::sleep(Duration::from_millis(self.options.retry_delay)).await;
            }
        }

        Err(RouteError::ProviderError(format!(
            "Failed after {} retries",
            self.options.retries
        )))
    }
}

impl DirectionsProvider for GoogleDirectionsProvider {
    async fn get_path(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        waypoints: &[GeoPoint],
    ) -> Result<DirectionsPath> {
        let query = self.query(origin, destination, waypoints);
        let body = self.fetch(&query).await?;
        parse_directions_response(&body)
    }
}

fn format_point(point: &GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

/// `optimize:false` keeps the provider from reordering the waypoints.
fn format_waypoints(waypoints: &[GeoPoint]) -> String {
    let mut value = String::from("optimize:false");
    for point in waypoints {
        value.push('|');
        value.push_str(&format_point(point));
    }
    value
}

/// Converts a Directions API body into a path. Legs map one-to-one onto
/// segments; the overview polyline becomes the path shape.
pub fn parse_directions_response(body: &str) -> Result<DirectionsPath> {
    let response: DirectionsResponse = serde_json::from_str(body)?;

    if response.status != "OK" {
        let message = match response.error_message {
            Some(detail) => format!("{}: {}", response.status, detail),
            None => response.status,
        };
        return Err(RouteError::ProviderError(message));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::ProviderError(NO_ROUTE_FOUND.to_string()))?;

    let segments = route
        .legs
        .iter()
        .map(|leg| PathSegment {
            distance_km: leg.distance.value / 1000.0,
            duration_sec: leg.duration.value.max(0.0).round() as u64,
        })
        .collect();

    Ok(DirectionsPath {
        polyline: decode_polyline(&route.overview_polyline.points)?,
        segments,
    })
}
