/// Reservoir NFT marketplace adapter
///
/// API Documentation: https://docs.reservoir.tools/reference/overview
///
/// Endpoint used: /collections/v7?id={collectionId}. Reservoir runs one host
/// per chain; the `chain` parameter selects it, defaulting to ethereum.
pub mod types;

use crate::adapters::{PreparedRequest, SourceAdapter, SourceDescriptor};
use crate::errors::{RelayError, RelayResult};
use crate::types::{CollectionInfo, Operation, ParameterSet, Payload};

use self::types::ReservoirCollectionsRaw;

const SOURCE_ID: &str = "reservoir";
const BASE_URL: &str = "https://api.reservoir.tools";

const CHAIN_HOSTS: &[(&str, &str)] = &[
    ("ethereum", "https://api.reservoir.tools"),
    ("polygon", "https://api-polygon.reservoir.tools"),
    ("arbitrum", "https://api-arbitrum.reservoir.tools"),
    ("optimism", "https://api-optimism.reservoir.tools"),
    ("base", "https://api-base.reservoir.tools"),
];

const DEFAULT_CHAIN: &str = "ethereum";

const CAPABILITIES: &[Operation] = &[Operation::CollectionInfo];

static DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    id: SOURCE_ID,
    base_endpoint: BASE_URL,
    capabilities: CAPABILITIES,
};

pub struct ReservoirAdapter;

impl ReservoirAdapter {
    pub fn new() -> Self {
        Self
    }

    fn host_for_chain(chain: &str) -> RelayResult<&'static str> {
        CHAIN_HOSTS
            .iter()
            .find(|(name, _)| *name == chain)
            .map(|(_, host)| *host)
            .ok_or_else(|| {
                RelayError::invalid_parameters(format!(
                    "reservoir has no host for chain '{}'",
                    chain
                ))
            })
    }

    fn decode_collection(raw: &str, parameters: &ParameterSet) -> RelayResult<Payload> {
        let response: ReservoirCollectionsRaw = serde_json::from_str(raw).map_err(|e| {
            RelayError::upstream(SOURCE_ID, format!("malformed collections response: {}", e))
        })?;

        let collection = response
            .collections
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::upstream(SOURCE_ID, "collection not found"))?;

        let floor_price = collection
            .floor_ask
            .as_ref()
            .and_then(|ask| ask.price.as_ref())
            .and_then(|price| price.amount.as_ref())
            .and_then(|amount| amount.native.or(amount.decimal));
        let volume_24h = collection.volume.as_ref().and_then(|v| v.one_day);

        Ok(Payload::CollectionInfo(CollectionInfo {
            id: collection.id,
            chain: parameters
                .get("chain")
                .unwrap_or(DEFAULT_CHAIN)
                .to_string(),
            name: collection.name,
            token_count: collection.token_count.parse().unwrap_or(0),
            floor_price,
            volume_24h,
        }))
    }
}

impl SourceAdapter for ReservoirAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn prepare(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
    ) -> RelayResult<PreparedRequest> {
        match operation {
            Operation::CollectionInfo => {
                let collection_id = parameters.require("collectionId")?;
                let chain = parameters.get("chain").unwrap_or(DEFAULT_CHAIN);
                let host = Self::host_for_chain(chain)?;
                Ok(PreparedRequest::get(format!(
                    "{}/collections/v7?id={}",
                    host, collection_id
                )))
            }
            _ => Err(RelayError::UnsupportedOperation {
                source_id: SOURCE_ID.to_string(),
                operation,
            }),
        }
    }

    fn decode(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
        raw: &str,
    ) -> RelayResult<Payload> {
        match operation {
            Operation::CollectionInfo => Self::decode_collection(raw, parameters),
            _ => Err(RelayError::UnsupportedOperation {
                source_id: SOURCE_ID.to_string(),
                operation,
            }),
        }
    }
}
