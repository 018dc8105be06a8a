//! Contract operation messages
//!
//! Addresses are carried as raw 21-byte values (prefix byte included).

#![allow(missing_docs)]

use prost::Message;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum AccountType {
    Normal = 0,
    AssetIssue = 1,
    Contract = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ResourceCode {
    Bandwidth = 0,
    Energy = 1,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountCreateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub account_address: Vec<u8>,
    #[prost(enumeration = "AccountType", tag = "3")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Vote {
    #[prost(bytes = "vec", tag = "1")]
    pub vote_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct VoteWitnessContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub votes: Vec<Vote>,
    #[prost(bool, tag = "3")]
    pub support: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct WitnessCreateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub url: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WitnessUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "12")]
    pub update_url: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AccountUpdateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FreezeBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int64, tag = "2")]
    pub frozen_balance: i64,
    #[prost(int64, tag = "3")]
    pub frozen_duration: i64,
    #[prost(enumeration = "ResourceCode", tag = "10")]
    pub resource: i32,
    #[prost(bytes = "vec", tag = "15")]
    pub receiver_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct UnfreezeBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(enumeration = "ResourceCode", tag = "10")]
    pub resource: i32,
    #[prost(bytes = "vec", tag = "15")]
    pub receiver_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct WithdrawBalanceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
}

/// Contract ABI as stored on chain
pub mod abi {
    use prost::Message;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum EntryType {
        UnknownEntryType = 0,
        Constructor = 1,
        Function = 2,
        Event = 3,
        Fallback = 4,
        Receive = 5,
        Error = 6,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum StateMutabilityType {
        UnknownMutabilityType = 0,
        Pure = 1,
        View = 2,
        Nonpayable = 3,
        Payable = 4,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Param {
        #[prost(bool, tag = "1")]
        pub indexed: bool,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub r#type: String,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Entry {
        #[prost(bool, tag = "1")]
        pub anonymous: bool,
        #[prost(bool, tag = "2")]
        pub constant: bool,
        #[prost(string, tag = "3")]
        pub name: String,
        #[prost(message, repeated, tag = "4")]
        pub inputs: Vec<Param>,
        #[prost(message, repeated, tag = "5")]
        pub outputs: Vec<Param>,
        #[prost(enumeration = "EntryType", tag = "6")]
        pub r#type: i32,
        #[prost(bool, tag = "7")]
        pub payable: bool,
        #[prost(enumeration = "StateMutabilityType", tag = "8")]
        pub state_mutability: i32,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Abi {
        #[prost(message, repeated, tag = "1")]
        pub entrys: Vec<Entry>,
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct SmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub origin_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub abi: Option<abi::Abi>,
    #[prost(bytes = "vec", tag = "4")]
    pub bytecode: Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_value: i64,
    #[prost(int64, tag = "6")]
    pub consume_user_resource_percent: i64,
    #[prost(string, tag = "7")]
    pub name: String,
    #[prost(int64, tag = "8")]
    pub origin_energy_limit: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct CreateSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub new_contract: Option<SmartContract>,
    #[prost(int64, tag = "3")]
    pub call_token_value: i64,
    #[prost(int64, tag = "4")]
    pub token_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TriggerSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub call_value: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_token_value: i64,
    #[prost(int64, tag = "6")]
    pub token_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct UpdateSettingContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub consume_user_resource_percent: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct UpdateEnergyLimitContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub origin_energy_limit: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClearAbiContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct UpdateBrokerageContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub brokerage: i32,
}
