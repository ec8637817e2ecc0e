//! Solidity interfaces of the migration contracts.

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// Token migrator: reads the legacy ERC721/ERC20 contracts and mints on the new ones.
    interface ICryptoCardsTokenMigrator {
        function packsBalanceOf(address owner) external view returns (uint256);
        function packsTokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function cardsBalanceOf(address owner) external view returns (uint256);
        function cardsTokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function isTokenFrozen(uint256 tokenId) external view returns (bool);
        function packHashById(uint256 tokenId) external view returns (string);
        function cardHashById(uint256 tokenId) external view returns (uint256);

        function mintNewPack(address to, string packData) external;
        function mintNewCards(address to, uint256[] cardHashes) external;

        function migrateTokenHolder(address tokenHolder) external;
        function distributeInitialGum() external;

        event TokenMigration(address indexed owner, uint256 oldAmount, uint256 newAmount);
    }

    /// Card library: card hash helpers and the pack purchase counters.
    interface ICryptoCardsLib {
        function cardRankFromHash(uint256 cardHash) external pure returns (uint256);
        function cardIssueFromHash(uint256 cardHash) external pure returns (uint256);

        function setContractController(address controller) external;
        function incrementPurchasedPackCount(address owner, uint256 amount) external;
    }
}
