//! The closed set of ezCon options the launcher knows how to edit.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionGroup {
    Processing,
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub group: OptionGroup,
}

const fn processing(key: &'static str, label: &'static str, help: &'static str) -> OptionSpec {
    OptionSpec {
        key,
        label,
        help,
        group: OptionGroup::Processing,
    }
}

const fn display(key: &'static str, label: &'static str, help: &'static str) -> OptionSpec {
    OptionSpec {
        key,
        label,
        help,
        group: OptionGroup::Display,
    }
}

/// Catalog order is the order options are emitted on the command line.
pub const OPTION_CATALOG: &[OptionSpec] = &[
    processing(
        "-ezConRawSamplesUseL",
        "RawSamplesUseL (first last)",
        "Example: 0 100 (first and last raw sample numbers)",
    ),
    processing(
        "-ezConRawFreqBinHide",
        "RawFreqBinHide",
        "Example: 129 (hide raw freq bin 129 by copying from bin 128)",
    ),
    processing(
        "-ezConRefMode",
        "RefMode",
        "Example: 1 (1: REF = 1.0, 0: first sample, negative: previous sample)",
    ),
    processing(
        "-ezConAntSamplesUseL",
        "AntSamplesUseL (first last)",
        "Example: 25 102 (first and last Ant sample numbers)",
    ),
    processing("-ezConAntPluck", "AntPluck", "Example: 29 (Ant sample to pluck)"),
    processing(
        "-ezConAntAvgPluckQtyL",
        "AntAvgPluckQtyL (low high)",
        "Example: 3 5 (pluck lowest 3 and highest 5)",
    ),
    processing(
        "-ezConAntAvgPluckFracL",
        "AntAvgPluckFracL (low high)",
        "Example: .02 .03 (pluck lowest 2% and highest 3%)",
    ),
    processing(
        "-ezConAntFreqBinSmooth",
        "AntFreqBinSmooth",
        "Example: 1.1 (RFI spur limiter multiplier)",
    ),
    display("-ezConRefAvgPluckQtyL", "RefAvgPluckQtyL (low high)", "Example: 3 5"),
    display(
        "-ezConRefAvgPluckFracL",
        "RefAvgPluckFracL (low high)",
        "Example: .02 .03",
    ),
    display(
        "-ezConAntBaselineFreqBinsFracL",
        "AntBaselineFreqBinsFracL (4 numbers)",
        "Example: 0 0.2344 0.7657 1",
    ),
    display(
        "-ezConAntRABaselineFreqBinsFracL",
        "AntRABaselineFreqBinsFracL (4 numbers)",
        "Example: 0 0.2344 0.7657 1",
    ),
    display(
        "-ezConAntXInput",
        "AntXInput",
        "Example: 6 (-1 for Auto, 0/2/4/5/6 for specific choices)",
    ),
    display(
        "-ezConAntXTFreqBinsFracL",
        "AntXTFreqBinsFracL (start stop)",
        "Example: 0.2344 0.7657",
    ),
    display("-ezConUseVlsr", "UseVlsr", "Example: 1 (use VLSr)"),
    display(
        "-ezConAntXTVTFreqBinsFracL",
        "AntXTVTFreqBinsFracL (start stop)",
        "Example: 0.4 0.6",
    ),
    display(
        "-ezConAntXTVTMaxPluckQtyL",
        "AntXTVTMaxPluckQtyL (low high)",
        "Example: 3 5",
    ),
    display(
        "-ezConAntXTVTMaxPluckValL",
        "AntXTVTMaxPluckValL (low high)",
        "Example: .01 .03",
    ),
    display(
        "-ezConAntXTVTAvgPluckQtyL",
        "AntXTVTAvgPluckQtyL (low high)",
        "Example: 3 5",
    ),
    display(
        "-ezConAntXTVTAvgPluckValL",
        "AntXTVTAvgPluckValL (low high)",
        "Example: .01 .03",
    ),
    display("-ezConAntXTVTPluck", "AntXTVTPluck", "Example: 33"),
    display("-ezConPlotRangeL", "PlotRangeL (start end)", "Example: 0 300"),
    display("-ezConRawDispIndex", "RawDispIndex", "Example: 1"),
    display("-ezConDispGrid", "DispGrid", "Example: 1"),
    display("-ezConDispFreqBin", "DispFreqBin (1 or 2)", "Example: 1 (or 2)"),
    display("-ezConHeatVMinMaxL", "HeatVMinMaxL (min max)", "Example: 1.0 1.4"),
    display("-ezConAstroMath", "AstroMath (0,1,2)", "Example: 1 (0, 1, or 2)"),
    display("-ezConVelGLonEdgeFrac", "VelGLonEdgeFrac", "Example: 0.5"),
    display(
        "-ezConGalCrossingGLatCenter",
        "GalCrossingGLatCenter",
        "Example: 2.4",
    ),
    display(
        "-ezConGalCrossingGLatCenterL",
        "GalCrossingGLatCenterL (start stop num)",
        "Example: -5.2 6.3 11",
    ),
    display("-ezConGalCrossingGLatNear", "GalCrossingGLatNear", "Example: 2.3"),
    display(
        "-ezConGalCrossingGLonCenter",
        "GalCrossingGLonCenter",
        "Example: 72.4",
    ),
    display(
        "-ezConGalCrossingGLonCenterL",
        "GalCrossingGLonCenterL (start stop num)",
        "Example: 69.6 82.4 13",
    ),
    display("-ezConGalCrossingGLonNear", "GalCrossingGLonNear", "Example: 2.7"),
    display(
        "-ezCon399SignalSampleByFreqBinL",
        "399SignalSampleByFreqBinL (val1 val2)",
        "Example: 18 1423",
    ),
];

/// Read-only fields shown from the defaults file; never part of the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayField {
    pub key: &'static str,
    pub label: &'static str,
}

pub const DISPLAY_FIELDS: &[DisplayField] = &[
    DisplayField { key: "-ezRAObsLat", label: "Observer Latitude" },
    DisplayField { key: "-ezRAObsLon", label: "Observer Longitude" },
    DisplayField { key: "-ezRAObsAmsl", label: "Observer Altitude (m)" },
    DisplayField { key: "-ezRAObsName", label: "Observer Name" },
    DisplayField { key: "-ezColAzimuth", label: "Antenna Azimuth" },
    DisplayField { key: "-ezColElevation", label: "Antenna Elevation" },
    DisplayField { key: "-ezColCenterFreqAnt", label: "Receiver CenterFreq Ant" },
    DisplayField { key: "-ezColCenterFreqRef", label: "Receiver CenterFreq Ref" },
    DisplayField { key: "-ezColBandWidth", label: "BandWidth" },
];

pub fn find_option(key: &str) -> Option<&'static OptionSpec> {
    OPTION_CATALOG.iter().find(|spec| spec.key == key)
}

pub fn is_catalog_key(key: &str) -> bool {
    find_option(key).is_some()
}

pub fn options_in(group: OptionGroup) -> impl Iterator<Item = &'static OptionSpec> {
    OPTION_CATALOG.iter().filter(move |spec| spec.group == group)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let keys: HashSet<_> = OPTION_CATALOG.iter().map(|spec| spec.key).collect();
        assert_eq!(keys.len(), OPTION_CATALOG.len());
    }

    #[test]
    fn groups_partition_the_catalog() {
        let processing = options_in(OptionGroup::Processing).count();
        let display = options_in(OptionGroup::Display).count();
        assert_eq!(processing, 8);
        assert_eq!(processing + display, OPTION_CATALOG.len());
    }

    #[test]
    fn display_fields_are_not_options() {
        assert!(DISPLAY_FIELDS.iter().all(|field| !is_catalog_key(field.key)));
    }
}
