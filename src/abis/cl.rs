use alloy::sol;

// Concentrated-liquidity pools that report protocol fees in the swap event
// (PancakeSwap V3 style). Same shape as the V3 swap plus two fee fields.
sol! {
    event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick, uint128 protocolFeesToken0, uint128 protocolFeesToken1);
}
