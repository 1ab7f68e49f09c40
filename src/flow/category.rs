use serde::{Deserialize, Serialize};

/// 预设研究方向，作为查询的快捷入口
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchCategory {
    PlantBiology,
    HumanPhysiology,
    Microbiology,
    Radiation,
    BoneMuscle,
    CellBiology,
}

impl ResearchCategory {
    pub fn all() -> &'static [ResearchCategory] {
        &[
            ResearchCategory::PlantBiology,
            ResearchCategory::HumanPhysiology,
            ResearchCategory::Microbiology,
            ResearchCategory::Radiation,
            ResearchCategory::BoneMuscle,
            ResearchCategory::CellBiology,
        ]
    }

    /// 该方向对应的研究问题
    pub fn query(&self) -> &'static str {
        match self {
            ResearchCategory::PlantBiology => "plant growth and development in microgravity",
            ResearchCategory::HumanPhysiology => "human physiological adaptation to spaceflight",
            ResearchCategory::Microbiology => "microbial behavior and virulence in spaceflight",
            ResearchCategory::Radiation => "space radiation effects on biological systems",
            ResearchCategory::BoneMuscle => "bone and muscle loss in microgravity",
            ResearchCategory::CellBiology => "cellular and molecular responses to spaceflight",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResearchCategory::PlantBiology => "Plant Biology",
            ResearchCategory::HumanPhysiology => "Human Physiology",
            ResearchCategory::Microbiology => "Microbiology",
            ResearchCategory::Radiation => "Space Radiation",
            ResearchCategory::BoneMuscle => "Bone & Muscle",
            ResearchCategory::CellBiology => "Cell Biology",
        }
    }
}

impl std::fmt::Display for ResearchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResearchCategory::PlantBiology => write!(f, "plant-biology"),
            ResearchCategory::HumanPhysiology => write!(f, "human-physiology"),
            ResearchCategory::Microbiology => write!(f, "microbiology"),
            ResearchCategory::Radiation => write!(f, "radiation"),
            ResearchCategory::BoneMuscle => write!(f, "bone-muscle"),
            ResearchCategory::CellBiology => write!(f, "cell-biology"),
        }
    }
}

impl std::str::FromStr for ResearchCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "plant-biology" | "plants" => Ok(ResearchCategory::PlantBiology),
            "human-physiology" | "human" => Ok(ResearchCategory::HumanPhysiology),
            "microbiology" | "microbes" => Ok(ResearchCategory::Microbiology),
            "radiation" => Ok(ResearchCategory::Radiation),
            "bone-muscle" | "musculoskeletal" => Ok(ResearchCategory::BoneMuscle),
            "cell-biology" | "cells" => Ok(ResearchCategory::CellBiology),
            _ => Err(format!("Unknown research category: {}", s)),
        }
    }
}
