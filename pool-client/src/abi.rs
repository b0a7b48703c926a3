//! Solidity ABI definitions of the pool contract
#![allow(missing_docs)]
#![allow(clippy::too_many_arguments)]

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    contract Heiswap {
        function getRingHash(uint256 amountEther, uint256 index) external view returns (bytes memory);
        function getForceCloseBlocksLeft(uint256 amountEther, uint256 index) external view returns (uint256);
        function getParticipants(uint256 amountEther, uint256 index) external view returns (uint256 deposited, uint256 withdrawn);
        function getPublicKeys(uint256 amountEther, uint256 index) external view returns (uint256[2][6] memory);

        function forceCloseRing(uint256 amountEther, uint256 index, uint256 c0, uint256[2] memory keyImage, uint256[] memory s) external;
        function withdraw(address receiver, uint256 amountEther, uint256 index, uint256 c0, uint256[2] memory keyImage, uint256[] memory s) external;
    }
}
