use alloy::sol;

// Shares its topic0 with the ERC-20 Transfer; the two are told apart by
// topic count (the tokenId here is indexed).
sol! {
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    event ApprovalForAll(address indexed owner, address indexed operator, bool approved);
}
