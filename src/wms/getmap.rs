//! WMS GetMap request construction
//!
//! Builds the key/value query of an OGC WMS GetMap operation and appends it
//! to a service URL, preserving any query the URL already carries (MapServer
//! endpoints commonly embed `map=/path/to/file.map`).

use crate::core::bounds::Extent;
use crate::wms::version::{AxisOrder, WmsVersion};
use crate::{MapError, Result};
use reqwest::Url;
use serde::Serialize;

/// GetMap request parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetMapRequest {
    pub version: WmsVersion,
    /// Layers to draw, in server draw order
    pub layers: Vec<String>,
    /// One style per layer; empty means server defaults
    pub styles: Vec<String>,
    /// Coordinate reference system, e.g. "EPSG:4326"
    pub crs: String,
    /// Requested region in `crs` units, always stored x,y
    pub bbox: Extent,
    pub width: u32,
    pub height: u32,
    /// Response MIME type
    pub format: String,
    pub transparent: bool,
    /// Extra non-standard parameters, appended last in order
    pub vendor_params: Vec<(String, String)>,
}

impl GetMapRequest {
    /// BBOX value in the axis order the version requires
    pub fn bbox_param(&self) -> String {
        match self.version.axis_order(&self.crs) {
            AxisOrder::XY => self.bbox.to_bbox_string(),
            AxisOrder::LatLon => self.bbox.to_bbox_string_yx(),
        }
    }

    /// Ordered key/value pairs of the request
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("SERVICE".to_string(), "WMS".to_string()),
            ("VERSION".to_string(), self.version.to_string()),
            ("REQUEST".to_string(), "GetMap".to_string()),
            ("LAYERS".to_string(), self.layers.join(",")),
            ("STYLES".to_string(), self.styles.join(",")),
            ("FORMAT".to_string(), self.format.clone()),
        ];
        if self.transparent {
            params.push(("TRANSPARENT".to_string(), "TRUE".to_string()));
        }
        params.push((self.version.crs_param().to_string(), self.crs.clone()));
        params.push(("BBOX".to_string(), self.bbox_param()));
        params.push(("WIDTH".to_string(), self.width.to_string()));
        params.push(("HEIGHT".to_string(), self.height.to_string()));

        for (key, value) in &self.vendor_params {
            params.push((key.clone(), value.clone()));
        }
        params
    }

    /// Full request URL against `service_url`.
    ///
    /// Parameters already present in the service URL are kept unless the
    /// request sets the same key (compared case-insensitively).
    pub fn to_url(&self, service_url: &str) -> Result<String> {
        let mut url = parse_service_url(service_url)?;
        let params = self.params();

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !params.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in kept.iter().chain(params.iter()) {
                query.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }
}

/// Parses an absolute http(s) service URL
pub fn parse_service_url(service_url: &str) -> Result<Url> {
    let url = Url::parse(service_url)
        .map_err(|e| MapError::InvalidUrl(format!("{}: {}", service_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MapError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            service_url, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(version: WmsVersion) -> GetMapRequest {
        GetMapRequest {
            version,
            layers: vec![
                "city_poly".to_string(),
                "county_borders".to_string(),
                "parcels".to_string(),
            ],
            styles: Vec::new(),
            crs: "EPSG:4326".to_string(),
            bbox: Extent::new(-94.5, 46.97, -92.98, 47.94),
            width: 256,
            height: 256,
            format: "image/png".to_string(),
            transparent: false,
            vendor_params: Vec::new(),
        }
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_getmap_query_1_1_1() {
        let url = request(WmsVersion::V1_1_1)
            .to_url("http://localhost/mapserver")
            .unwrap();
        let query = query_of(&url);

        assert_eq!(query["SERVICE"], "WMS");
        assert_eq!(query["VERSION"], "1.1.1");
        assert_eq!(query["REQUEST"], "GetMap");
        assert_eq!(query["LAYERS"], "city_poly,county_borders,parcels");
        assert_eq!(query["SRS"], "EPSG:4326");
        assert_eq!(query["BBOX"], "-94.5,46.97,-92.98,47.94");
        assert_eq!(query["WIDTH"], "256");
        assert!(!query.contains_key("CRS"));
        assert!(!query.contains_key("TRANSPARENT"));
    }

    #[test]
    fn test_getmap_query_1_3_0_flips_geographic_bbox() {
        let url = request(WmsVersion::V1_3_0)
            .to_url("http://localhost/mapserver")
            .unwrap();
        let query = query_of(&url);

        assert_eq!(query["CRS"], "EPSG:4326");
        assert_eq!(query["BBOX"], "46.97,-94.5,47.94,-92.98");
    }

    #[test]
    fn test_existing_query_is_preserved() {
        let mut req = request(WmsVersion::V1_1_1);
        req.transparent = true;
        req.vendor_params.push(("map_resolution".to_string(), "96".to_string()));

        let url = req
            .to_url("http://localhost/cgi-bin/mapserv?map=/srv/city.map&service=WFS")
            .unwrap();
        let query = query_of(&url);

        assert_eq!(query["map"], "/srv/city.map");
        assert_eq!(query["SERVICE"], "WMS");
        assert!(!query.contains_key("service"));
        assert_eq!(query["TRANSPARENT"], "TRUE");
        assert_eq!(query["map_resolution"], "96");
    }

    #[test]
    fn test_rejects_relative_and_non_http_urls() {
        assert!(parse_service_url("/geoserver/wms").is_err());
        assert!(parse_service_url("ftp://localhost/wms").is_err());
        assert!(parse_service_url("https://example.org/wms").is_ok());
    }
}
