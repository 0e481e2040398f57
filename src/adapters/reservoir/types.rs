/// Raw Reservoir response shapes
///
/// Only the fields the normalizer needs; the `/collections/v7` payload is
/// much larger.
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirCollectionsRaw {
    pub collections: Vec<ReservoirCollectionRaw>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirCollectionRaw {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token_count: String,
    #[serde(default)]
    pub floor_ask: Option<ReservoirFloorAskRaw>,
    #[serde(default)]
    pub volume: Option<ReservoirVolumeRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirFloorAskRaw {
    #[serde(default)]
    pub price: Option<ReservoirPriceRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirPriceRaw {
    #[serde(default)]
    pub amount: Option<ReservoirAmountRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirAmountRaw {
    #[serde(default)]
    pub native: Option<f64>,
    #[serde(default)]
    pub decimal: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservoirVolumeRaw {
    #[serde(rename = "1day", default)]
    pub one_day: Option<f64>,
}
