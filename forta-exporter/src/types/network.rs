/// Returns the network name for a chain id.
///
/// Unknown ids map to the empty string: they are valid, just unlabeled.
pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "ethereum",
        10 => "optimism",
        56 => "bsc",
        137 => "polygon",
        250 => "fantom",
        42161 => "arbitrum",
        43114 => "avalanche",
        _ => "",
    }
}
