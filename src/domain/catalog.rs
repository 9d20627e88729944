//! 臨床發現模組目錄。
//!
//! 目錄順序就是配置順序：共用資源池依此順序先到先得。

use crate::domain::model::{
    CoefficientSet, ExamSource, Guideline, ModuleDefinition, ModuleState, Service,
};

const BASE: CoefficientSet = CoefficientSet {
    exam_volume_override: None,
    exam_share_pct: 0.0,
    detection_pct: 0.0,
    capture_with_platform_pct: 70.0,
    capture_baseline_pct: 30.0,
    conversion_pct: 0.0,
    ion_share_pct: 0.0,
    da_vinci_share_pct: 0.0,
    followups_per_procedure: 1.0,
    specialists: 0,
    capacity_per_specialist: 0.0,
};

pub static MODULES: &[ModuleDefinition] = &[
    ModuleDefinition {
        id: "lcs",
        name: "Lung Cancer Screening (LCS)",
        group: "Pulmonary",
        exam_source: ExamSource::RecurringScreening,
        required_services: &[Service::Ip, Service::CtSurg],
        defaults: CoefficientSet {
            detection_pct: 12.0,
            conversion_pct: 35.0,
            ion_share_pct: 55.0,
            da_vinci_share_pct: 10.0,
            followups_per_procedure: 1.1,
            specialists: 4,
            capacity_per_specialist: 160.0,
            ..BASE
        },
        blurb: "Captures LR3/4 follow-ups, navigational bronch, and surgical resections via structured pathways.",
        guidelines: &[Guideline {
            label: "ACR Lung-RADS v2022",
            url: "https://www.acr.org/-/media/ACR/Files/RADS/Lung-RADS/Lung-RADS-2022.pdf",
        }],
    },
    ModuleDefinition {
        id: "pulm",
        name: "Incidental Pulmonary Nodules",
        group: "Pulmonary",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Ip, Service::CtSurg],
        defaults: CoefficientSet {
            exam_share_pct: 18.0,
            detection_pct: 4.5,
            conversion_pct: 28.0,
            ion_share_pct: 50.0,
            da_vinci_share_pct: 15.0,
            followups_per_procedure: 1.2,
            specialists: 3,
            capacity_per_specialist: 150.0,
            ..BASE
        },
        blurb: "Automates Fleischner-based recall and escalates 8mm+ nodules to bronch/surgery per clinic protocol.",
        guidelines: &[Guideline {
            label: "Fleischner (2017)",
            url: "https://pubs.rsna.org/doi/epdf/10.1148/radiol.2017161659",
        }],
    },
    ModuleDefinition {
        id: "renal",
        name: "Renal Mass",
        group: "Urology",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Urology],
        defaults: CoefficientSet {
            exam_share_pct: 17.0,
            detection_pct: 2.4,
            conversion_pct: 40.0,
            da_vinci_share_pct: 70.0,
            followups_per_procedure: 2.1,
            specialists: 4,
            capacity_per_specialist: 135.0,
            ..BASE
        },
        blurb: "Tracks Bosniak III/IV and enhancing masses; routes to urology for ablation/partial nephrectomy.",
        guidelines: &[Guideline {
            label: "ACR Incidental Renal (Bosniak 2019)",
            url: "https://www.jacr.org/article/S1546-1440(17)30497-0/pdf",
        }],
    },
    ModuleDefinition {
        id: "adrenal",
        name: "Adrenal Incidentaloma",
        group: "Endocrine",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Urology],
        defaults: CoefficientSet {
            exam_share_pct: 8.0,
            detection_pct: 1.0,
            conversion_pct: 16.0,
            da_vinci_share_pct: 35.0,
            followups_per_procedure: 1.1,
            specialists: 2,
            capacity_per_specialist: 120.0,
            ..BASE
        },
        blurb: "Separates benign/managed vs 1-4cm indeterminate vs >4cm/high HU for endocrine/urology pathways.",
        guidelines: &[Guideline {
            label: "ACR/ESE/AAES Adrenal",
            url: "https://www.jacr.org/article/S1546-1440(17)30551-3/pdf",
        }],
    },
    ModuleDefinition {
        id: "liver",
        name: "Liver Lesion",
        group: "HPB",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 10.0,
            detection_pct: 1.7,
            conversion_pct: 18.0,
            da_vinci_share_pct: 15.0,
            followups_per_procedure: 1.4,
            specialists: 3,
            capacity_per_specialist: 140.0,
            ..BASE
        },
        blurb: "LI-RADS 4/5 prompt HPB consult, multiphasic MR/CT, and tumor board scheduling.",
        guidelines: &[Guideline {
            label: "ACR LI-RADS / AASLD",
            url: "https://www.jacr.org/article/S1546-1440(17)30889-X/pdf",
        }],
    },
    ModuleDefinition {
        id: "pancreas",
        name: "Pancreatic Cyst/Mass",
        group: "HPB",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 7.0,
            detection_pct: 1.3,
            conversion_pct: 22.0,
            da_vinci_share_pct: 10.0,
            followups_per_procedure: 1.8,
            specialists: 3,
            capacity_per_specialist: 130.0,
            ..BASE
        },
        blurb: "Triages IPMN/MCN per size and worrisome features; EUS/MRCP cadence with HPB oversight.",
        guidelines: &[Guideline {
            label: "AGA / Fukuoka Cysts",
            url: "https://journals.lww.com/ajg/fulltext/2018/04000/acg_clinical_guideline__diagnosis_and_management.8.aspx",
        }],
    },
    ModuleDefinition {
        id: "thyroid",
        name: "Thyroid Nodule (TI-RADS)",
        group: "Endocrine",
        exam_source: ExamSource::IncidentalFinding,
        // ENT/內分泌外科沒有獨立開關，對應到專科外科
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 12.0,
            detection_pct: 2.8,
            conversion_pct: 20.0,
            da_vinci_share_pct: 20.0,
            followups_per_procedure: 1.9,
            specialists: 3,
            capacity_per_specialist: 150.0,
            ..BASE
        },
        blurb: "Coordinates US/FNA for TR4-5; schedules endocrine/ENT surgery for appropriate cases.",
        guidelines: &[Guideline {
            label: "ACR TI-RADS",
            url: "https://www.acr.org/Clinical-Resources/Reporting-and-Data-Systems/TI-RADS",
        }],
    },
    ModuleDefinition {
        id: "vascular",
        name: "Aneurysm (AAA/TAA)",
        group: "Vascular",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Vascular],
        defaults: CoefficientSet {
            exam_share_pct: 6.0,
            detection_pct: 1.1,
            conversion_pct: 10.0,
            followups_per_procedure: 1.0,
            specialists: 2,
            capacity_per_specialist: 140.0,
            ..BASE
        },
        blurb: "AAA 3.0-3.9cm annual US; 4.0-5.4cm semi-annual; >=5.5cm referral for repair evaluation.",
        guidelines: &[Guideline {
            label: "SVS / ACC/AHA",
            url: "https://vascular.org/",
        }],
    },
    ModuleDefinition {
        id: "ovary",
        name: "Ovarian (O-RADS)",
        group: "Gyn",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Gyn],
        defaults: CoefficientSet {
            exam_share_pct: 5.0,
            detection_pct: 0.8,
            conversion_pct: 14.0,
            da_vinci_share_pct: 20.0,
            followups_per_procedure: 1.2,
            specialists: 2,
            capacity_per_specialist: 130.0,
            ..BASE
        },
        blurb: "US follow-up for simple cysts; O-RADS 4-5 to gynecologic oncology.",
        guidelines: &[Guideline {
            label: "ACR O-RADS / SRU",
            url: "https://www.jacr.org/article/S1546-1440(18)30839-1/pdf",
        }],
    },
    ModuleDefinition {
        id: "lymph",
        name: "Lymph Nodes",
        group: "General",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 14.0,
            detection_pct: 2.2,
            conversion_pct: 12.0,
            followups_per_procedure: 1.1,
            specialists: 3,
            capacity_per_specialist: 140.0,
            ..BASE
        },
        blurb: "Biopsy planning for >1.5cm/necrotic nodes; 3-month imaging for 1-1.5cm.",
        guidelines: &[Guideline {
            label: "ACR Incidental Lymph Nodes",
            url: "https://www.jacr.org/article/S1546-1440(13)00305-0/pdf",
        }],
    },
    ModuleDefinition {
        id: "prostate",
        name: "Prostate (PI-RADS)",
        group: "Urology",
        exam_source: ExamSource::DedicatedExam,
        required_services: &[Service::Urology],
        defaults: CoefficientSet {
            detection_pct: 20.0,
            conversion_pct: 55.0,
            da_vinci_share_pct: 60.0,
            followups_per_procedure: 1.0,
            specialists: 3,
            capacity_per_specialist: 150.0,
            ..BASE
        },
        blurb: "Routes PI-RADS 4-5 for targeted biopsy and surgical consultation; da Vinci share adjustable.",
        guidelines: &[Guideline {
            label: "AUA / NCCN / PI-RADS",
            url: "https://www.auanet.org/guidelines",
        }],
    },
    ModuleDefinition {
        id: "cac",
        name: "CAC / Valvular",
        group: "Cardio",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Vascular],
        defaults: CoefficientSet {
            exam_share_pct: 10.0,
            detection_pct: 5.0,
            conversion_pct: 6.0,
            followups_per_procedure: 1.0,
            specialists: 4,
            capacity_per_specialist: 180.0,
            ..BASE
        },
        blurb: "Risk management plus selective cath/PCI; focus on leakage reduction to in-system cardiology.",
        guidelines: &[Guideline {
            label: "ACC/AHA / SCCT",
            url: "https://www.jacc.org/",
        }],
    },
    ModuleDefinition {
        id: "ila",
        name: "Interstitial Lung Abnormalities",
        group: "Pulmonary",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::Ip],
        defaults: CoefficientSet {
            exam_share_pct: 10.0,
            detection_pct: 2.0,
            conversion_pct: 5.0,
            ion_share_pct: 10.0,
            followups_per_procedure: 1.0,
            specialists: 3,
            capacity_per_specialist: 150.0,
            ..BASE
        },
        blurb: "Ensures pulmonology follow-up and guideline HRCT cadence; selective advanced interventions.",
        guidelines: &[Guideline {
            label: "ATS/ERS/JRS/ALAT",
            url: "https://www.thoracic.org/",
        }],
    },
    ModuleDefinition {
        id: "breast",
        name: "Incidental Breast (BI-RADS)",
        group: "Breast",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 6.0,
            detection_pct: 0.7,
            conversion_pct: 18.0,
            followups_per_procedure: 1.0,
            specialists: 3,
            capacity_per_specialist: 140.0,
            ..BASE
        },
        blurb: "Short-interval diagnostic mammo for BI-RADS 3; core needle biopsy and surgical referrals for 4-5.",
        guidelines: &[Guideline {
            label: "ACR BI-RADS / SBI",
            url: "https://www.acr.org/Clinical-Resources/Reporting-and-Data-Systems/Bi-Rads",
        }],
    },
    ModuleDefinition {
        id: "hernia",
        name: "Hernia (All Types)",
        group: "General Surgery",
        exam_source: ExamSource::IncidentalFinding,
        required_services: &[Service::GiOnc],
        defaults: CoefficientSet {
            exam_share_pct: 10.0,
            detection_pct: 3.0,
            conversion_pct: 60.0,
            da_vinci_share_pct: 75.0,
            followups_per_procedure: 1.3,
            specialists: 4,
            capacity_per_specialist: 150.0,
            ..BASE
        },
        blurb: "Routes symptomatic or high-risk hernias (inguinal, ventral, hiatal) for surgical consultation and da Vinci repair.",
        guidelines: &[Guideline {
            label: "AHS / SAGES",
            url: "https://americasherniasociety.org/",
        }],
    },
];

pub fn find(id: &str) -> Option<&'static ModuleDefinition> {
    MODULES.iter().find(|m| m.id == id)
}

pub fn default_states() -> Vec<ModuleState> {
    MODULES.iter().map(ModuleState::new).collect()
}
