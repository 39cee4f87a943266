//! Declarative query descriptions submitted to an imagery backend.
//!
//! Every numeric parameter here is fixed by the procedure that builds the
//! query; callers choose only the region and the date range.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::models::dates::DateRange;

/// Linear scale (meters) for vectorizing the historical water extent
pub const HISTORICAL_EXTENT_SCALE_M: f64 = 30.0;

/// Linear scale (meters) for vectorizing the date-ranged water spread
pub const WATER_SPREAD_SCALE_M: f64 = 10.0;

/// Maximum error (meters) tolerated by backend area computations
pub const AREA_MAX_ERROR_M: f64 = 10.0;

/// Shape of a structuring element used for connected-component labeling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelShape {
    /// Center plus the four edge neighbours at each radius step
    Plus,
    /// Full square window
    Square,
}

/// Structuring element defining which pixels count as adjacent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    pub shape: KernelShape,
    pub radius: u32,
}

impl Kernel {
    pub fn plus(radius: u32) -> Self {
        Self { shape: KernelShape::Plus, radius }
    }

    pub fn square(radius: u32) -> Self {
        Self { shape: KernelShape::Square, radius }
    }

    /// Neighbour offsets as (row, col), excluding the center
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius as isize;
        let mut offsets = Vec::new();
        for dr in -r..=r {
            for dc in -r..=r {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let inside = match self.shape {
                    KernelShape::Plus => dr == 0 || dc == 0,
                    KernelShape::Square => true,
                };
                if inside {
                    offsets.push((dr, dc));
                }
            }
        }
        offsets
    }
}

/// Connected-component labeling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentParams {
    pub kernel: Kernel,
    /// Components with more pixels than this are masked out
    pub max_size: usize,
}

impl Default for ComponentParams {
    fn default() -> Self {
        Self { kernel: Kernel::plus(1), max_size: 1023 }
    }
}

/// Per-polygon aggregation of the attribute band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Mean,
    Sum,
}

impl Reducer {
    /// Property name the reduced value is stored under
    pub fn output_name(&self) -> &'static str {
        match self {
            Reducer::Mean => "mean",
            Reducer::Sum => "sum",
        }
    }

    /// Reduce a set of values; `None` when there is nothing to reduce
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        match self {
            Reducer::Sum => Some(sum),
            Reducer::Mean => Some(sum / values.len() as f64),
        }
    }
}

/// Raster-to-polygon conversion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizeParams {
    /// Pixel size in meters
    pub scale: f64,
    /// Diagonal neighbours join the same polygon when true
    pub eight_connected: bool,
    pub max_pixels: u64,
    pub reducer: Reducer,
}

impl VectorizeParams {
    /// 30 m, 8-connected, mean reducer
    pub fn historical_extent() -> Self {
        Self {
            scale: HISTORICAL_EXTENT_SCALE_M,
            eight_connected: true,
            max_pixels: 1_000_000_000,
            reducer: Reducer::Mean,
        }
    }

    /// 10 m, 4-connected, sum reducer
    pub fn water_spread() -> Self {
        Self {
            scale: WATER_SPREAD_SCALE_M,
            eight_connected: false,
            max_pixels: 5_000_000_000_000,
            reducer: Reducer::Sum,
        }
    }
}

/// Quality-band bit flags used to drop cloudy pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudMask {
    pub qa_band: String,
    pub cloud_bit: u8,
    pub cirrus_bit: u8,
}

impl Default for CloudMask {
    fn default() -> Self {
        Self { qa_band: "QA60".to_string(), cloud_bit: 10, cirrus_bit: 11 }
    }
}

impl CloudMask {
    /// A pixel is kept only when both the cloud and cirrus bits are unset
    pub fn is_clear(&self, qa: u16) -> bool {
        let cloud = 1u16 << self.cloud_bit;
        let cirrus = 1u16 << self.cirrus_bit;
        qa & cloud == 0 && qa & cirrus == 0
    }
}

/// Normalized difference of two reflectance bands: (first - second) / (first + second)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectralIndex {
    pub first_band: String,
    pub second_band: String,
    pub name: String,
}

impl SpectralIndex {
    /// Green / near-infrared water index
    pub fn ndwi() -> Self {
        Self {
            first_band: "B3".to_string(),
            second_band: "B8".to_string(),
            name: "ndwi".to_string(),
        }
    }
}

impl Default for SpectralIndex {
    fn default() -> Self {
        Self::ndwi()
    }
}

/// Query for vectorized connected components of the historical maximum water extent
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentQuery {
    pub region: MultiPolygon<f64>,
    pub dataset: String,
    pub band: String,
    pub components: ComponentParams,
    pub vectorize: VectorizeParams,
}

impl ExtentQuery {
    pub fn historical(region: MultiPolygon<f64>) -> Self {
        Self {
            region,
            dataset: "JRC/GSW1_3/GlobalSurfaceWater".to_string(),
            band: "max_extent".to_string(),
            components: ComponentParams::default(),
            vectorize: VectorizeParams::historical_extent(),
        }
    }
}

/// Query for the vectorized water mask of a max-composited spectral index
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeQuery {
    pub region: MultiPolygon<f64>,
    pub collection: String,
    pub dates: DateRange,
    pub cloud_mask: CloudMask,
    pub index: SpectralIndex,
    /// Pixels with composite index strictly above this value are water
    pub threshold: f64,
    pub vectorize: VectorizeParams,
}

impl CompositeQuery {
    pub fn water_spread(region: MultiPolygon<f64>, dates: DateRange) -> Self {
        Self {
            region,
            collection: "COPERNICUS/S2".to_string(),
            dates,
            cloud_mask: CloudMask::default(),
            index: SpectralIndex::ndwi(),
            threshold: 0.1,
            vectorize: VectorizeParams::water_spread(),
        }
    }
}
