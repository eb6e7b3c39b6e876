use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IPoolFactory {
        function factory() external view returns (address);
    }
}
