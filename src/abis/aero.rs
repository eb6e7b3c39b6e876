use alloy::sol;

// Solidly / ve(3,3) pair swap as emitted by Aerodrome V2 pools. Unlike the
// Uniswap V2 variant both actors are indexed and there is no trailing `to`.
sol! {
    event Swap(address indexed sender, address indexed to, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out);
}
