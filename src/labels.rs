//! Detection labels and module capability flags
//!
//! Both the label codes and the property-flag bit assignments are part of
//! the external ABI; binary-compat consumers rely on the exact values.

/// Closed set of detection labels with ABI-stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DetectionLabel {
    Default = 0,
    Person = 200,
    Lp = 1000,
    LpEuOneLine = 1001,
    LpEuMultiLine = 1002,
    LpNorthAmerica = 1200,
    LpAsiaPacific = 1300,
    LpMiddleEast = 1400,
    Adr = 2000,
    AdrString = 2001,
    AdrEmpty = 2002,
    Trash = 2100,
    SpeedLimit = 2200,
    OversizeLoad = 2210,
    Vignette = 2300,
    Vehicle = 3000,
    VehicleFront = 3001,
    VehicleRear = 3002,
    VehicleWindshield = 3010,
    VehicleWheel = 3020,
}

impl DetectionLabel {
    /// Numeric code as carried over the binary interface.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Resolve a numeric code back into the closed enumeration.
    pub fn from_code(code: i32) -> Option<Self> {
        use DetectionLabel::*;
        Some(match code {
            0 => Default,
            200 => Person,
            1000 => Lp,
            1001 => LpEuOneLine,
            1002 => LpEuMultiLine,
            1200 => LpNorthAmerica,
            1300 => LpAsiaPacific,
            1400 => LpMiddleEast,
            2000 => Adr,
            2001 => AdrString,
            2002 => AdrEmpty,
            2100 => Trash,
            2200 => SpeedLimit,
            2210 => OversizeLoad,
            2300 => Vignette,
            3000 => Vehicle,
            3001 => VehicleFront,
            3002 => VehicleRear,
            3010 => VehicleWindshield,
            3020 => VehicleWheel,
            _ => return None,
        })
    }
}

/// Detector kind advertised by a module. Bits 0-7 of the property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Frontal,
    Generic,
    LFrontal,
    RgbFrontal,
    RgbGeneric,
    WFrontal,
}

impl DetectorKind {
    pub fn bit(self) -> u64 {
        match self {
            DetectorKind::Frontal => 0x0001,
            DetectorKind::Generic => 0x0002,
            DetectorKind::LFrontal => 0x0004,
            DetectorKind::RgbFrontal => 0x0008,
            DetectorKind::RgbGeneric => 0x0010,
            DetectorKind::WFrontal => 0x0020,
        }
    }

    /// Parse the manifest tag ("frontal", "lfrontal", "rgb-frontal", ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "frontal" => DetectorKind::Frontal,
            "generic" => DetectorKind::Generic,
            "lfrontal" => DetectorKind::LFrontal,
            "rgb-frontal" => DetectorKind::RgbFrontal,
            "rgb-generic" => DetectorKind::RgbGeneric,
            "wfrontal" => DetectorKind::WFrontal,
            _ => return None,
        })
    }
}

/// Object kind a module detects. Bits 8-15 of the property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    LicensePlate,
    AdrPlate,
    LicensePlateSecondary,
    Windshield,
    Face,
    Lcd,
    Vehicle,
}

impl ObjectKind {
    pub fn bit(self) -> u64 {
        match self {
            ObjectKind::LicensePlate => 0x0100,
            ObjectKind::AdrPlate => 0x0200,
            ObjectKind::LicensePlateSecondary => 0x0400,
            ObjectKind::Windshield => 0x0800,
            ObjectKind::Face => 0x1000,
            ObjectKind::Lcd => 0x2000,
            ObjectKind::Vehicle => 0x4000,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "lp" | "license plates" => ObjectKind::LicensePlate,
            "adr" | "adr plates" => ObjectKind::AdrPlate,
            "lp2" => ObjectKind::LicensePlateSecondary,
            "win" | "windshield" => ObjectKind::Windshield,
            "face" => ObjectKind::Face,
            "lcd" => ObjectKind::Lcd,
            "car" | "vehicle" => ObjectKind::Vehicle,
            _ => return None,
        })
    }
}

/// Regional OCR set a module ships. Bits 16-39 of the property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrRegion {
    CzechRepublic,
    Europe,
    Asia,
    Africa,
    Adr,
    Oceania,
    Lcd,
    General,
    NorthAmerica,
}

impl OcrRegion {
    pub fn bit(self) -> u64 {
        match self {
            OcrRegion::CzechRepublic => 0x0000_0001_0000,
            OcrRegion::Europe => 0x0000_0002_0000,
            OcrRegion::Asia => 0x0000_0004_0000,
            OcrRegion::Africa => 0x0000_0008_0000,
            OcrRegion::Adr => 0x0000_0010_0000,
            OcrRegion::Oceania => 0x0000_0020_0000,
            OcrRegion::Lcd => 0x0000_0040_0000,
            OcrRegion::General => 0x0000_0080_0000,
            OcrRegion::NorthAmerica => 0x0000_0800_0000,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "cz" => OcrRegion::CzechRepublic,
            "eu" => OcrRegion::Europe,
            "as" => OcrRegion::Asia,
            "af" => OcrRegion::Africa,
            "adr" => OcrRegion::Adr,
            "oc" => OcrRegion::Oceania,
            "lcd" => OcrRegion::Lcd,
            "gen" => OcrRegion::General,
            "na" => OcrRegion::NorthAmerica,
            _ => return None,
        })
    }
}

/// Recognition (non-OCR classifier) kind. Bits 40-47 of the property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognitionKind {
    VehicleClassifier,
}

impl RecognitionKind {
    pub fn bit(self) -> u64 {
        match self {
            RecognitionKind::VehicleClassifier => 0x0100_0000_0000,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "vcl" => Some(RecognitionKind::VehicleClassifier),
            _ => None,
        }
    }
}

/// 64-bit module capability bit-set.
///
/// Detector bits 0-7, object bits 8-15, OCR-region bits 16-39, recognition
/// bits 40-47; the remaining bits are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags(u64);

impl PropertyFlags {
    pub const DET_MASK: u64 = 0x0000_0000_FFFF;
    pub const OCR_MASK: u64 = 0x00FF_FFFF_0000;
    pub const RCG_MASK: u64 = 0xFF00_0000_0000;

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn with_detector(mut self, kind: DetectorKind) -> Self {
        self.0 |= kind.bit();
        self
    }

    pub fn with_object(mut self, kind: ObjectKind) -> Self {
        self.0 |= kind.bit();
        self
    }

    pub fn with_ocr_region(mut self, region: OcrRegion) -> Self {
        self.0 |= region.bit();
        self
    }

    pub fn with_recognition(mut self, kind: RecognitionKind) -> Self {
        self.0 |= kind.bit();
        self
    }

    pub fn has_detector(self, kind: DetectorKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn has_object(self, kind: ObjectKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn has_ocr_region(self, region: OcrRegion) -> bool {
        self.0 & region.bit() != 0
    }

    pub fn has_recognition(self, kind: RecognitionKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when any OCR regional set is present.
    pub fn ocr_enabled(self) -> bool {
        self.0 & Self::OCR_MASK != 0
    }

    /// True when any detector kind is present.
    pub fn det_enabled(self) -> bool {
        self.0 & Self::DET_MASK != 0
    }
}
