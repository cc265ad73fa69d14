//! Static reference statistics for diseases without a live feed.
//!
//! Malaria, tuberculosis and HIV figures come from the WHO and UNAIDS annual
//! reports and are compiled into the binary. COVID-19 and influenza are
//! served live and have no profile here.

use serde::Serialize;

/// Every disease the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseId {
    Covid,
    Influenza,
    Malaria,
    Tuberculosis,
    Hiv,
}

impl DiseaseId {
    pub const ALL: [DiseaseId; 5] = [
        DiseaseId::Covid,
        DiseaseId::Influenza,
        DiseaseId::Malaria,
        DiseaseId::Tuberculosis,
        DiseaseId::Hiv,
    ];

    /// Parse an identifier, ignoring case. `tb` is accepted for tuberculosis.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "covid" | "covid-19" => Some(DiseaseId::Covid),
            "influenza" | "flu" => Some(DiseaseId::Influenza),
            "malaria" => Some(DiseaseId::Malaria),
            "tuberculosis" | "tb" => Some(DiseaseId::Tuberculosis),
            "hiv" => Some(DiseaseId::Hiv),
            _ => None,
        }
    }

    /// True for diseases served from a live upstream feed.
    pub fn is_live(&self) -> bool {
        matches!(self, DiseaseId::Covid | DiseaseId::Influenza)
    }

    /// The compiled-in profile, if this disease has one.
    pub fn profile(&self) -> Option<&'static DiseaseProfile> {
        match self {
            DiseaseId::Malaria => Some(&MALARIA),
            DiseaseId::Tuberculosis => Some(&TUBERCULOSIS),
            DiseaseId::Hiv => Some(&HIV),
            DiseaseId::Covid | DiseaseId::Influenza => None,
        }
    }
}

/// A disease's published annual statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseProfile {
    pub name: &'static str,
    pub icon: &'static str,
    pub last_updated: &'static str,
    pub source: &'static str,
    pub global: GlobalEstimate,

    /// Regions in the order the report lists them.
    pub by_region: &'static [RegionStat],

    pub key_facts: &'static [&'static str],
}

/// Worldwide headline estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalEstimate {
    pub estimated_cases: u64,
    pub deaths: u64,
    pub countries_affected: u32,
    pub extra: ExtraMetric,
}

/// The one disease-specific headline figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExtraMetric {
    PeopleAtRisk(u64),
    PeopleOnTreatment(u64),
}

impl ExtraMetric {
    pub fn label(&self) -> &'static str {
        match self {
            ExtraMetric::PeopleAtRisk(_) => "People at Risk",
            ExtraMetric::PeopleOnTreatment(_) => "People on Treatment",
        }
    }

    pub fn value(&self) -> u64 {
        match self {
            ExtraMetric::PeopleAtRisk(v) | ExtraMetric::PeopleOnTreatment(v) => *v,
        }
    }
}

/// Cases and deaths in one WHO region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionStat {
    pub region: &'static str,
    pub cases: u64,
    pub deaths: u64,
}

const fn region(region: &'static str, cases: u64, deaths: u64) -> RegionStat {
    RegionStat {
        region,
        cases,
        deaths,
    }
}

pub static MALARIA: DiseaseProfile = DiseaseProfile {
    name: "Malaria",
    icon: "🦟",
    last_updated: "2024 WHO Report",
    source: "WHO World Malaria Report 2024",
    global: GlobalEstimate {
        estimated_cases: 249_000_000,
        deaths: 608_000,
        countries_affected: 85,
        extra: ExtraMetric::PeopleAtRisk(2_400_000_000),
    },
    by_region: &[
        region("African Region", 233_700_000, 580_000),
        region("South-East Asia", 5_800_000, 12_000),
        region("Eastern Mediterranean", 4_700_000, 9_800),
        region("Western Pacific", 2_200_000, 3_500),
        region("Americas", 650_000, 600),
        region("European Region", 0, 0),
    ],
    key_facts: &[
        "Nearly half of the world's population is at risk",
        "Children under 5 account for 76% of malaria deaths",
        "95% of cases occur in Africa",
        "Preventable and curable disease",
        "Data Source: WHO World Malaria Report 2024",
    ],
};

pub static TUBERCULOSIS: DiseaseProfile = DiseaseProfile {
    name: "Tuberculosis (TB)",
    icon: "🫁",
    last_updated: "2024 WHO Report",
    source: "WHO Global Tuberculosis Report 2024",
    global: GlobalEstimate {
        estimated_cases: 10_600_000,
        deaths: 1_300_000,
        countries_affected: 194,
        extra: ExtraMetric::PeopleAtRisk(2_000_000_000),
    },
    by_region: &[
        region("South-East Asia", 4_590_000, 733_000),
        region("African Region", 2_500_000, 536_000),
        region("Western Pacific", 2_000_000, 182_000),
        region("Eastern Mediterranean", 842_000, 73_000),
        region("Americas", 322_000, 32_000),
        region("European Region", 230_000, 24_000),
    ],
    key_facts: &[
        "Leading cause of death from infectious disease",
        "One of top 10 causes of death worldwide",
        "Curable and preventable",
        "Drug-resistant TB is a major concern",
        "Data Source: WHO Global TB Report 2024",
    ],
};

pub static HIV: DiseaseProfile = DiseaseProfile {
    name: "HIV/AIDS",
    icon: "🎗️",
    last_updated: "2024 UNAIDS Report",
    source: "UNAIDS Global AIDS Update 2024",
    global: GlobalEstimate {
        estimated_cases: 39_000_000,
        deaths: 630_000,
        countries_affected: 195,
        extra: ExtraMetric::PeopleOnTreatment(29_800_000),
    },
    by_region: &[
        region("African Region", 25_600_000, 480_000),
        region("Americas", 5_600_000, 48_000),
        region("South-East Asia", 4_200_000, 62_000),
        region("European Region", 2_200_000, 29_000),
        region("Western Pacific", 2_100_000, 11_000),
        region("Eastern Mediterranean", 300_000, 8_000),
    ],
    key_facts: &[
        "39 million people living with HIV globally",
        "29.8 million people on antiretroviral therapy",
        "No cure, but can be controlled with treatment",
        "New infections declined by 52% since peak in 1997",
        "Data Source: UNAIDS Global AIDS Update 2024",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disease_id() {
        assert_eq!(DiseaseId::parse("Malaria"), Some(DiseaseId::Malaria));
        assert_eq!(DiseaseId::parse("TB"), Some(DiseaseId::Tuberculosis));
        assert_eq!(DiseaseId::parse(" hiv "), Some(DiseaseId::Hiv));
        assert_eq!(DiseaseId::parse("covid-19"), Some(DiseaseId::Covid));
        assert_eq!(DiseaseId::parse("measles"), None);
    }

    #[test]
    fn test_only_static_diseases_have_profiles() {
        for id in DiseaseId::ALL {
            assert_eq!(id.profile().is_none(), id.is_live(), "{id:?}");
        }
    }

    #[test]
    fn test_profiles_have_six_regions() {
        for profile in [&MALARIA, &TUBERCULOSIS, &HIV] {
            assert_eq!(profile.by_region.len(), 6, "{}", profile.name);
            assert!(!profile.key_facts.is_empty());
        }
    }

    #[test]
    fn test_hiv_extra_metric_is_treatment() {
        assert_eq!(
            HIV.global.extra,
            ExtraMetric::PeopleOnTreatment(29_800_000)
        );
        assert_eq!(HIV.global.extra.label(), "People on Treatment");
        assert_eq!(MALARIA.global.extra.value(), 2_400_000_000);
    }
}
