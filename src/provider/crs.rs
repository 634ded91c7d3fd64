//! Coordinate reference systems supported by geo-reprojection.
//!
//! - `EPSG:4326`: WGS84 longitude/latitude in degrees (x = lon, y = lat)
//! - `EPSG:3857`: Web Mercator metres on a sphere of radius 6378137
//! - `EPSG:326zz` / `EPSG:327zz`: UTM zone `zz` north / south on WGS84
//!
//! UTM uses the transverse Mercator series (Snyder, "Map Projections: A
//! Working Manual", pp. 57-64), accurate to well under a millimetre inside
//! a zone.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;
use std::str::FromStr;

use crate::core::WorldPoint;
use crate::error::{DcdError, Result};

/// WGS84 semi-major axis (metres)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM scale factor on the central meridian
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
/// Web Mercator latitude limit (degrees)
const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// Supported coordinate reference system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326
    Wgs84,
    /// EPSG:3857
    WebMercator,
    /// EPSG:326zz (north) or EPSG:327zz (south)
    Utm {
        /// Zone number 1..=60
        zone: u8,
        /// Northern hemisphere
        north: bool,
    },
}

impl Crs {
    /// Parse `"EPSG:<code>"` or a bare code.
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        let digits = match (trimmed.get(..5), trimmed.get(5..)) {
            (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case("EPSG:") => rest,
            _ => trimmed,
        };
        let epsg: u32 = digits
            .parse()
            .map_err(|_| DcdError::UnsupportedCrs(code.to_string()))?;
        Self::from_epsg(epsg)
    }

    /// Look up by numeric EPSG code.
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        match epsg {
            4326 => Ok(Crs::Wgs84),
            3857 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (epsg - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (epsg - 32700) as u8,
                north: false,
            }),
            other => Err(DcdError::UnsupportedCrs(format!("EPSG:{other}"))),
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match *self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
            Crs::Utm { zone, north: true } => 32600 + zone as u32,
            Crs::Utm { zone, north: false } => 32700 + zone as u32,
        }
    }

    /// Project a point of this CRS to WGS84 (lon, lat).
    pub fn to_wgs84(&self, p: WorldPoint) -> WorldPoint {
        match *self {
            Crs::Wgs84 => p,
            Crs::WebMercator => {
                let lon = (p.x / WGS84_A).to_degrees();
                let lat = (2.0 * (p.y / WGS84_A).exp().atan() - FRAC_PI_2).to_degrees();
                WorldPoint::new(lon, lat)
            }
            Crs::Utm { zone, north } => utm_inverse(p, zone, north),
        }
    }

    /// Project a WGS84 (lon, lat) point into this CRS.
    pub fn from_wgs84(&self, p: WorldPoint) -> WorldPoint {
        match *self {
            Crs::Wgs84 => p,
            Crs::WebMercator => {
                let lat = p.y.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
                let x = WGS84_A * p.x.to_radians();
                let y = WGS84_A * (FRAC_PI_4 + lat / 2.0).tan().ln();
                WorldPoint::new(x, y)
            }
            Crs::Utm { zone, north } => utm_forward(p, zone, north),
        }
    }

    /// Transform a point from this CRS into `to`.
    pub fn transform(&self, p: WorldPoint, to: &Crs) -> WorldPoint {
        if self == to {
            return p;
        }
        to.from_wgs84(self.to_wgs84(p))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = DcdError;

    fn from_str(s: &str) -> Result<Self> {
        Crs::parse(s)
    }
}

fn central_meridian(zone: u8) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

fn eccentricity_sq() -> f64 {
    WGS84_F * (2.0 - WGS84_F)
}

fn meridian_arc(phi: f64) -> f64 {
    let e2 = eccentricity_sq();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

fn utm_forward(p: WorldPoint, zone: u8, north: bool) -> WorldPoint {
    let e2 = eccentricity_sq();
    let ep2 = e2 / (1.0 - e2);
    let phi = p.y.to_radians();
    let lam = p.x.to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = phi.tan().powi(2);
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lam - central_meridian(zone));
    let m = meridian_arc(phi);

    let x = UTM_K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + UTM_FALSE_EASTING;
    let mut y = UTM_K0
        * (m + n
            * phi.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if !north {
        y += UTM_FALSE_NORTHING_SOUTH;
    }
    WorldPoint::new(x, y)
}

fn utm_inverse(p: WorldPoint, zone: u8, north: bool) -> WorldPoint {
    let e2 = eccentricity_sq();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let x = p.x - UTM_FALSE_EASTING;
    let y = if north {
        p.y
    } else {
        p.y - UTM_FALSE_NORTHING_SOUTH
    };

    let m = y / UTM_K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    // Footpoint latitude
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1) = phi1.sin_cos();
    let n1 = WGS84_A / (1.0 - e2 * sin1 * sin1).sqrt();
    let t1 = phi1.tan().powi(2);
    let c1 = ep2 * cos1 * cos1;
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = x / (n1 * UTM_K0);

    let phi = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lam = central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos1;

    WorldPoint::new(lam.to_degrees(), phi.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_non_ascii_code() {
        for code in ["EPSGé4326", "EPSé:4326", "é", "EPSG:é"] {
            assert!(matches!(Crs::parse(code), Err(DcdError::UnsupportedCrs(_))));
        }
        assert_eq!(Crs::parse(" epsg:4326 ").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::parse("3857").unwrap(), Crs::WebMercator);
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(Crs::parse("EPSG:4326").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::parse("epsg:3857").unwrap(), Crs::WebMercator);
        assert_eq!(
            Crs::parse("32632").unwrap(),
            Crs::Utm {
                zone: 32,
                north: true
            }
        );
        assert_eq!(
            Crs::parse("EPSG:32733").unwrap(),
            Crs::Utm {
                zone: 33,
                north: false
            }
        );
        assert!(matches!(
            Crs::parse("EPSG:31467"),
            Err(DcdError::UnsupportedCrs(_))
        ));
        assert!(Crs::parse("web").is_err());
        assert_eq!(Crs::Utm { zone: 32, north: true }.to_string(), "EPSG:32632");
    }

    #[test]
    fn test_utm_central_meridian_equator() {
        // Zone 31 central meridian is 3°E
        let utm = Crs::Utm {
            zone: 31,
            north: true,
        };
        let p = utm.from_wgs84(WorldPoint::new(3.0, 0.0));
        assert_relative_eq!(p.x, 500_000.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_utm_known_point() {
        // Munich, zone 32N: approx. E 691 600, N 5 334 700
        let utm = Crs::Utm {
            zone: 32,
            north: true,
        };
        let p = utm.from_wgs84(WorldPoint::new(11.5755, 48.1374));
        assert!((p.x - 691_600.0).abs() < 300.0, "easting {}", p.x);
        assert!((p.y - 5_334_700.0).abs() < 300.0, "northing {}", p.y);
    }

    #[test]
    fn test_utm_round_trip() {
        for north in [true, false] {
            let utm = Crs::Utm { zone: 32, north };
            let lat = if north { 48.15 } else { -33.9 };
            let geo = WorldPoint::new(10.2, lat);
            let back = utm.to_wgs84(utm.from_wgs84(geo));
            assert_relative_eq!(back.x, geo.x, epsilon = 1e-7);
            assert_relative_eq!(back.y, geo.y, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let geo = WorldPoint::new(-74.006, 40.7128);
        let merc = Crs::WebMercator.from_wgs84(geo);
        let back = Crs::WebMercator.to_wgs84(merc);
        assert_relative_eq!(back.x, geo.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, geo.y, epsilon = 1e-9);
    }

    #[test]
    fn test_transform_between_projections() {
        let utm = Crs::Utm {
            zone: 32,
            north: true,
        };
        let p = WorldPoint::new(692_000.0, 5_335_000.0);
        let merc = utm.transform(p, &Crs::WebMercator);
        let back = Crs::WebMercator.transform(merc, &utm);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-2);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-2);
    }
}
