use crate::utils::validation::{clamp_count, clamp_non_negative, clamp_pct};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 模組的檢查量來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamSource {
    /// 例行篩檢 (LCS)，全域數值以「每月」計
    RecurringScreening,
    /// 一般 CT 的偶發發現，依模組佔比分配全年 CT 量
    IncidentalFinding,
    /// 專屬檢查 (前列腺 MR)，全域數值以「每年」計
    DedicatedExam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    RadOnc,
    Chemo,
    Vascular,
    Ip,
    Gyn,
    CtSurg,
    Urology,
    GiOnc,
}

impl Service {
    pub const ALL: [Service; 8] = [
        Service::RadOnc,
        Service::Chemo,
        Service::Vascular,
        Service::Ip,
        Service::Gyn,
        Service::CtSurg,
        Service::Urology,
        Service::GiOnc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Service::RadOnc => "radOnc",
            Service::Chemo => "chemo",
            Service::Vascular => "vascular",
            Service::Ip => "ip",
            Service::Gyn => "gyn",
            Service::CtSurg => "ctSurg",
            Service::Urology => "urology",
            Service::GiOnc => "giOnc",
        }
    }

    /// 接受 camelCase 與 snake_case 兩種寫法
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Service::ALL
            .into_iter()
            .find(|service| service.key().to_ascii_lowercase() == normalized)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 兩個共用且有容量上限的程序資源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedResource {
    /// 導航支氣管鏡 (ION)
    Ion,
    /// 機器人手術 (da Vinci)
    DaVinci,
}

impl fmt::Display for SharedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedResource::Ion => f.write_str("ION"),
            SharedResource::DaVinci => f.write_str("da Vinci"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guideline {
    pub label: &'static str,
    pub url: &'static str,
}

/// 各模組可覆寫的係數；百分比以 0–100 儲存
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientSet {
    /// `None` 代表沿用全域檢查量
    pub exam_volume_override: Option<f64>,
    pub exam_share_pct: f64,
    /// 篩檢模組稱為 actionable %，其他模組稱為 detection %
    pub detection_pct: f64,
    pub capture_with_platform_pct: f64,
    pub capture_baseline_pct: f64,
    pub conversion_pct: f64,
    pub ion_share_pct: f64,
    pub da_vinci_share_pct: f64,
    pub followups_per_procedure: f64,
    pub specialists: u32,
    pub capacity_per_specialist: f64,
}

impl CoefficientSet {
    pub fn sanitized(&self) -> Self {
        Self {
            exam_volume_override: self
                .exam_volume_override
                .map(|v| clamp_non_negative("exam_volume_override", v)),
            exam_share_pct: clamp_pct("exam_share_pct", self.exam_share_pct),
            detection_pct: clamp_pct("detection_pct", self.detection_pct),
            capture_with_platform_pct: clamp_pct(
                "capture_with_platform_pct",
                self.capture_with_platform_pct,
            ),
            capture_baseline_pct: clamp_pct("capture_baseline_pct", self.capture_baseline_pct),
            conversion_pct: clamp_pct("conversion_pct", self.conversion_pct),
            ion_share_pct: clamp_pct("ion_share_pct", self.ion_share_pct),
            da_vinci_share_pct: clamp_pct("da_vinci_share_pct", self.da_vinci_share_pct),
            followups_per_procedure: clamp_non_negative(
                "followups_per_procedure",
                self.followups_per_procedure,
            ),
            specialists: self.specialists,
            capacity_per_specialist: clamp_non_negative(
                "capacity_per_specialist",
                self.capacity_per_specialist,
            ),
        }
    }

    /// 專科人力上限；沒有人力或每人產能為 0 時上限為 0 (包含 0 × ∞)
    pub fn staffing_ceiling(&self) -> f64 {
        if self.specialists == 0
            || self.capacity_per_specialist <= 0.0
            || self.capacity_per_specialist.is_nan()
        {
            return 0.0;
        }
        f64::from(self.specialists) * self.capacity_per_specialist
    }

    pub fn share_pct(&self, resource: SharedResource) -> f64 {
        match resource {
            SharedResource::Ion => self.ion_share_pct,
            SharedResource::DaVinci => self.da_vinci_share_pct,
        }
    }
}

/// 可單獨編輯的係數欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientField {
    ExamVolumeOverride,
    ExamSharePct,
    DetectionPct,
    CaptureWithPlatformPct,
    CaptureBaselinePct,
    ConversionPct,
    IonSharePct,
    DaVinciSharePct,
    FollowupsPerProcedure,
    Specialists,
    CapacityPerSpecialist,
}

impl CoefficientField {
    /// 寫入欄位；`None` 表示回到目錄預設值 (檢查量覆寫則回到「沿用全域」)
    pub fn apply(self, target: &mut CoefficientSet, defaults: &CoefficientSet, value: Option<f64>) {
        match self {
            CoefficientField::ExamVolumeOverride => {
                target.exam_volume_override =
                    value.map(|v| clamp_non_negative("exam_volume_override", v));
            }
            CoefficientField::ExamSharePct => {
                target.exam_share_pct = value
                    .map(|v| clamp_pct("exam_share_pct", v))
                    .unwrap_or(defaults.exam_share_pct);
            }
            CoefficientField::DetectionPct => {
                target.detection_pct = value
                    .map(|v| clamp_pct("detection_pct", v))
                    .unwrap_or(defaults.detection_pct);
            }
            CoefficientField::CaptureWithPlatformPct => {
                target.capture_with_platform_pct = value
                    .map(|v| clamp_pct("capture_with_platform_pct", v))
                    .unwrap_or(defaults.capture_with_platform_pct);
            }
            CoefficientField::CaptureBaselinePct => {
                target.capture_baseline_pct = value
                    .map(|v| clamp_pct("capture_baseline_pct", v))
                    .unwrap_or(defaults.capture_baseline_pct);
            }
            CoefficientField::ConversionPct => {
                target.conversion_pct = value
                    .map(|v| clamp_pct("conversion_pct", v))
                    .unwrap_or(defaults.conversion_pct);
            }
            CoefficientField::IonSharePct => {
                target.ion_share_pct = value
                    .map(|v| clamp_pct("ion_share_pct", v))
                    .unwrap_or(defaults.ion_share_pct);
            }
            CoefficientField::DaVinciSharePct => {
                target.da_vinci_share_pct = value
                    .map(|v| clamp_pct("da_vinci_share_pct", v))
                    .unwrap_or(defaults.da_vinci_share_pct);
            }
            CoefficientField::FollowupsPerProcedure => {
                target.followups_per_procedure = value
                    .map(|v| clamp_non_negative("followups_per_procedure", v))
                    .unwrap_or(defaults.followups_per_procedure);
            }
            CoefficientField::Specialists => {
                target.specialists = value
                    .map(|v| clamp_count("specialists", v))
                    .unwrap_or(defaults.specialists);
            }
            CoefficientField::CapacityPerSpecialist => {
                target.capacity_per_specialist = value
                    .map(|v| clamp_non_negative("capacity_per_specialist", v))
                    .unwrap_or(defaults.capacity_per_specialist);
            }
        }
    }
}

/// 目錄中一個臨床發現路徑的靜態定義
#[derive(Debug, PartialEq)]
pub struct ModuleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub group: &'static str,
    pub exam_source: ExamSource,
    pub required_services: &'static [Service],
    pub defaults: CoefficientSet,
    pub blurb: &'static str,
    pub guidelines: &'static [Guideline],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleState {
    pub definition: &'static ModuleDefinition,
    pub coefficients: CoefficientSet,
    pub enabled: bool,
}

impl ModuleState {
    pub fn new(definition: &'static ModuleDefinition) -> Self {
        Self {
            definition,
            coefficients: definition.defaults,
            enabled: true,
        }
    }

    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn reset(&mut self) {
        self.coefficients = self.definition.defaults;
        self.enabled = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayerClass {
    Medicare,
    Commercial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillableService {
    Clinic,
    Imaging,
    Procedure,
    Robotic,
}

impl BillableService {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "clinic" => Some(BillableService::Clinic),
            "imaging" => Some(BillableService::Imaging),
            "proc" | "procedure" => Some(BillableService::Procedure),
            "rob" | "robotic" => Some(BillableService::Robotic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayerPrices {
    pub medicare: f64,
    pub commercial: f64,
}

impl PayerPrices {
    pub const fn new(medicare: f64, commercial: f64) -> Self {
        Self {
            medicare,
            commercial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub clinic: PayerPrices,
    pub imaging: PayerPrices,
    #[serde(rename = "proc")]
    pub procedure: PayerPrices,
    #[serde(rename = "rob")]
    pub robotic: PayerPrices,
}

impl PriceTable {
    pub fn get(&self, service: BillableService) -> &PayerPrices {
        match service {
            BillableService::Clinic => &self.clinic,
            BillableService::Imaging => &self.imaging,
            BillableService::Procedure => &self.procedure,
            BillableService::Robotic => &self.robotic,
        }
    }

    pub fn get_mut(&mut self, service: BillableService) -> &mut PayerPrices {
        match service {
            BillableService::Clinic => &mut self.clinic,
            BillableService::Imaging => &mut self.imaging,
            BillableService::Procedure => &mut self.procedure,
            BillableService::Robotic => &mut self.robotic,
        }
    }

    pub fn set(&mut self, service: BillableService, payer: PayerClass, value: f64) {
        let prices = self.get_mut(service);
        let value = clamp_non_negative("price", value);
        match payer {
            PayerClass::Medicare => prices.medicare = value,
            PayerClass::Commercial => prices.commercial = value,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            clinic: PayerPrices::new(150.0, 280.0),
            imaging: PayerPrices::new(250.0, 520.0),
            procedure: PayerPrices::new(5000.0, 11000.0),
            robotic: PayerPrices::new(6500.0, 14000.0),
        }
    }
}

/// 全域情境設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfiguration {
    pub annual_cts: f64,
    pub monthly_lcs: f64,
    pub annual_prostate_mrs: f64,
    pub commercial_pct: f64,
    pub retained_pct: f64,
    pub ion_count: u32,
    pub ion_capacity: f64,
    pub da_vinci_count: u32,
    pub da_vinci_capacity: f64,
    pub prices: PriceTable,
    pub services: BTreeMap<Service, bool>,
}

impl Default for ScenarioConfiguration {
    fn default() -> Self {
        Self {
            annual_cts: 100_000.0,
            monthly_lcs: 250.0,
            annual_prostate_mrs: 500.0,
            commercial_pct: 10.0,
            retained_pct: 75.0,
            ion_count: 2,
            ion_capacity: 250.0,
            da_vinci_count: 3,
            da_vinci_capacity: 275.0,
            prices: PriceTable::default(),
            services: Service::ALL.into_iter().map(|s| (s, true)).collect(),
        }
    }
}

impl ScenarioConfiguration {
    pub fn sanitized(&self) -> Self {
        let clamp_prices = |p: &PayerPrices| PayerPrices {
            medicare: clamp_non_negative("price.medicare", p.medicare),
            commercial: clamp_non_negative("price.commercial", p.commercial),
        };

        Self {
            annual_cts: clamp_non_negative("annual_cts", self.annual_cts),
            monthly_lcs: clamp_non_negative("monthly_lcs", self.monthly_lcs),
            annual_prostate_mrs: clamp_non_negative(
                "annual_prostate_mrs",
                self.annual_prostate_mrs,
            ),
            commercial_pct: clamp_pct("commercial_pct", self.commercial_pct),
            retained_pct: clamp_pct("retained_pct", self.retained_pct),
            ion_count: self.ion_count,
            ion_capacity: clamp_non_negative("ion_capacity", self.ion_capacity),
            da_vinci_count: self.da_vinci_count,
            da_vinci_capacity: clamp_non_negative("da_vinci_capacity", self.da_vinci_capacity),
            prices: PriceTable {
                clinic: clamp_prices(&self.prices.clinic),
                imaging: clamp_prices(&self.prices.imaging),
                procedure: clamp_prices(&self.prices.procedure),
                robotic: clamp_prices(&self.prices.robotic),
            },
            services: self.services.clone(),
        }
    }

    /// 未列出的服務視為不可用
    pub fn is_available(&self, service: Service) -> bool {
        self.services.get(&service).copied().unwrap_or(false)
    }

    /// 資源池總量 = 台數 × 每台容量
    pub fn pool_capacity(&self, resource: SharedResource) -> f64 {
        let (count, capacity) = match resource {
            SharedResource::Ion => (self.ion_count, self.ion_capacity),
            SharedResource::DaVinci => (self.da_vinci_count, self.da_vinci_capacity),
        };
        f64::from(count) * clamp_non_negative("pool_capacity", capacity)
    }

    pub fn retained_share(&self) -> f64 {
        clamp_pct("retained_pct", self.retained_pct) / 100.0
    }
}
