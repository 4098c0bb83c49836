//! PM2.5 concentration → Air Quality Index mapping.
//!
//! Piecewise-linear interpolation over the EPA PM2.5 breakpoint table,
//! returning the integer AQI score together with the category label and the
//! CSS class the dashboard colors by. Total over all inputs: missing values
//! map to the "unknown" category, values beyond the table saturate to the
//! hazardous ceiling of 500, and negative readings clamp to zero.

// ---

/// One bucket of the breakpoint table.
struct Breakpoint {
    c_low: f64,
    c_high: f64,
    i_low: u16,
    i_high: u16,
    label: &'static str,
    class: &'static str,
}

/// EPA PM2.5 breakpoints (µg/m³), ascending and jointly covering [0, 500.4].
const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint {
        c_low: 0.0,
        c_high: 12.0,
        i_low: 0,
        i_high: 50,
        label: "good",
        class: "aqi-good",
    },
    Breakpoint {
        c_low: 12.1,
        c_high: 35.4,
        i_low: 51,
        i_high: 100,
        label: "moderate",
        class: "aqi-moderate",
    },
    Breakpoint {
        c_low: 35.5,
        c_high: 55.4,
        i_low: 101,
        i_high: 150,
        label: "unhealthy for sensitive groups",
        class: "aqi-usg",
    },
    Breakpoint {
        c_low: 55.5,
        c_high: 150.4,
        i_low: 151,
        i_high: 200,
        label: "unhealthy",
        class: "aqi-unhealthy",
    },
    Breakpoint {
        c_low: 150.5,
        c_high: 250.4,
        i_low: 201,
        i_high: 300,
        label: "very unhealthy",
        class: "aqi-very",
    },
    Breakpoint {
        c_low: 250.5,
        c_high: 500.4,
        i_low: 301,
        i_high: 500,
        label: "hazardous",
        class: "aqi-hazardous",
    },
];

/// AQI score and category for one PM2.5 reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AqiReading {
    /// `None` only for missing input.
    pub score: Option<u16>,
    pub label: &'static str,
    pub class: &'static str,
}

/// Map a PM2.5 concentration to its AQI score and category.
///
/// Scores round to the nearest integer, ties away from zero. Buckets are
/// matched by their upper bound, so readings landing in the tenth-of-a-unit
/// seam between two buckets (e.g. 12.05) take the next bucket's line and the
/// mapping stays monotone.
pub fn to_aqi(pm25: Option<f64>) -> AqiReading {
    // ---
    let Some(value) = pm25.filter(|v| !v.is_nan()) else {
        return AqiReading {
            score: None,
            label: "unknown",
            class: "aqi-unknown",
        };
    };
    let value = value.max(0.0);

    for bp in &PM25_BREAKPOINTS {
        if value <= bp.c_high {
            let slope = f64::from(bp.i_high - bp.i_low) / (bp.c_high - bp.c_low);
            let aqi = slope * (value - bp.c_low) + f64::from(bp.i_low);
            return AqiReading {
                score: Some(aqi.round() as u16),
                label: bp.label,
                class: bp.class,
            };
        }
    }

    // Beyond 500.4 µg/m³: saturate to the worst category.
    AqiReading {
        score: Some(500),
        label: "hazardous",
        class: "aqi-hazardous",
    }
}
