//! Transaction envelope messages

#![allow(missing_docs)]

use prost::Message;

/// Type-tagged payload, the protobuf `google.protobuf.Any` layout
#[derive(Clone, PartialEq, Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ContractType {
    AccountCreateContract = 0,
    TransferContract = 1,
    TransferAssetContract = 2,
    VoteAssetContract = 3,
    VoteWitnessContract = 4,
    WitnessCreateContract = 5,
    AssetIssueContract = 6,
    WitnessUpdateContract = 8,
    ParticipateAssetIssueContract = 9,
    AccountUpdateContract = 10,
    FreezeBalanceContract = 11,
    UnfreezeBalanceContract = 12,
    WithdrawBalanceContract = 13,
    UnfreezeAssetContract = 14,
    UpdateAssetContract = 15,
    ProposalCreateContract = 16,
    ProposalApproveContract = 17,
    ProposalDeleteContract = 18,
    SetAccountIdContract = 19,
    CreateSmartContract = 30,
    TriggerSmartContract = 31,
    UpdateSettingContract = 33,
    UpdateEnergyLimitContract = 45,
    AccountPermissionUpdateContract = 46,
    ClearAbiContract = 48,
    UpdateBrokerageContract = 49,
}

impl ContractType {
    /// Message name used in the `Any` type url
    pub fn message_name(&self) -> &'static str {
        match self {
            ContractType::AccountCreateContract => "AccountCreateContract",
            ContractType::TransferContract => "TransferContract",
            ContractType::TransferAssetContract => "TransferAssetContract",
            ContractType::VoteAssetContract => "VoteAssetContract",
            ContractType::VoteWitnessContract => "VoteWitnessContract",
            ContractType::WitnessCreateContract => "WitnessCreateContract",
            ContractType::AssetIssueContract => "AssetIssueContract",
            ContractType::WitnessUpdateContract => "WitnessUpdateContract",
            ContractType::ParticipateAssetIssueContract => "ParticipateAssetIssueContract",
            ContractType::AccountUpdateContract => "AccountUpdateContract",
            ContractType::FreezeBalanceContract => "FreezeBalanceContract",
            ContractType::UnfreezeBalanceContract => "UnfreezeBalanceContract",
            ContractType::WithdrawBalanceContract => "WithdrawBalanceContract",
            ContractType::UnfreezeAssetContract => "UnfreezeAssetContract",
            ContractType::UpdateAssetContract => "UpdateAssetContract",
            ContractType::ProposalCreateContract => "ProposalCreateContract",
            ContractType::ProposalApproveContract => "ProposalApproveContract",
            ContractType::ProposalDeleteContract => "ProposalDeleteContract",
            ContractType::SetAccountIdContract => "SetAccountIdContract",
            ContractType::CreateSmartContract => "CreateSmartContract",
            ContractType::TriggerSmartContract => "TriggerSmartContract",
            ContractType::UpdateSettingContract => "UpdateSettingContract",
            ContractType::UpdateEnergyLimitContract => "UpdateEnergyLimitContract",
            ContractType::AccountPermissionUpdateContract => "AccountPermissionUpdateContract",
            ContractType::ClearAbiContract => "ClearABIContract",
            ContractType::UpdateBrokerageContract => "UpdateBrokerageContract",
        }
    }

    /// Full type url, `type.googleapis.com/protocol.<Name>`
    pub fn type_url(&self) -> String {
        format!("type.googleapis.com/protocol.{}", self.message_name())
    }
}

pub mod transaction {
    use super::Any;
    use prost::Message;

    /// One operation inside a transaction
    #[derive(Clone, PartialEq, Message)]
    pub struct Contract {
        #[prost(enumeration = "super::ContractType", tag = "1")]
        pub r#type: i32,
        #[prost(message, optional, tag = "2")]
        pub parameter: Option<Any>,
        #[prost(bytes = "vec", tag = "3")]
        pub provider: Vec<u8>,
        #[prost(bytes = "vec", tag = "4")]
        pub contract_name: Vec<u8>,
        #[prost(int32, tag = "5")]
        pub permission_id: i32,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum Code {
        Sucess = 0,
        Failed = 1,
    }

    /// Execution result attached by nodes
    #[derive(Clone, PartialEq, Message)]
    pub struct Result {
        #[prost(int64, tag = "1")]
        pub fee: i64,
        #[prost(enumeration = "Code", tag = "2")]
        pub ret: i32,
        #[prost(int32, tag = "3")]
        pub contract_ret: i32,
    }

    /// Signed portion of a transaction
    #[derive(Clone, PartialEq, Message)]
    pub struct Raw {
        #[prost(bytes = "vec", tag = "1")]
        pub ref_block_bytes: Vec<u8>,
        #[prost(int64, tag = "3")]
        pub ref_block_num: i64,
        #[prost(bytes = "vec", tag = "4")]
        pub ref_block_hash: Vec<u8>,
        #[prost(int64, tag = "8")]
        pub expiration: i64,
        #[prost(bytes = "vec", tag = "10")]
        pub data: Vec<u8>,
        #[prost(message, repeated, tag = "11")]
        pub contract: Vec<Contract>,
        #[prost(bytes = "vec", tag = "12")]
        pub scripts: Vec<u8>,
        #[prost(int64, tag = "14")]
        pub timestamp: i64,
        #[prost(int64, tag = "18")]
        pub fee_limit: i64,
    }
}

/// Full transaction: raw data plus signatures
#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(message, optional, tag = "1")]
    pub raw_data: Option<transaction::Raw>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "5")]
    pub ret: Vec<transaction::Result>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_type_numbers() {
        assert_eq!(ContractType::TransferContract as i32, 1);
        assert_eq!(ContractType::WitnessUpdateContract as i32, 8);
        assert_eq!(ContractType::TriggerSmartContract as i32, 31);
        assert_eq!(ContractType::UpdateBrokerageContract as i32, 49);
        assert_eq!(ContractType::try_from(4).ok(), Some(ContractType::VoteWitnessContract));
        assert!(ContractType::try_from(7).is_err());
    }

    #[test]
    fn test_type_url() {
        assert_eq!(
            ContractType::TransferContract.type_url(),
            "type.googleapis.com/protocol.TransferContract"
        );
        assert_eq!(
            ContractType::ClearAbiContract.type_url(),
            "type.googleapis.com/protocol.ClearABIContract"
        );
    }

    #[test]
    fn test_raw_field_layout() {
        let raw = transaction::Raw {
            ref_block_bytes: vec![0x01, 0x02],
            ref_block_hash: vec![0xaa; 8],
            expiration: 1,
            timestamp: 1,
            fee_limit: 1,
            ..Default::default()
        };
        let bytes = raw.encode_to_vec();
        assert_eq!(
            hex::encode(&bytes),
            // 1: bytes, 4: bytes, 8: varint, 14: varint, 18: varint
            "0a02010222 08aaaaaaaaaaaaaaaa 4001 7001 900101".replace(' ', "")
        );
    }

    #[test]
    fn test_transaction_signatures_repeat() {
        let tx = Transaction {
            raw_data: None,
            signature: vec![vec![1], vec![2]],
            ret: vec![],
        };
        assert_eq!(tx.encode_to_vec(), vec![0x12, 0x01, 0x01, 0x12, 0x01, 0x02]);
        assert_eq!(Transaction::decode(tx.encode_to_vec().as_slice()).unwrap(), tx);
    }
}
