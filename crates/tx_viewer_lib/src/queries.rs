//! GraphQL documents. Field sets must match the server's `Transaction` type exactly,
//! any extra field fails the whole request.

pub const GET_ALL_TRANSACTIONS_NAME: &str = "GetAllTransactions";
pub const GET_ALL_TRANSACTIONS: &str = r"query GetAllTransactions {
  getAllTransactions {
    gasLimit
    gasPrice
    to
    from
    value
    data
    chainId
    hash
  }
}";

pub const GET_SINGLE_TRANSACTION_NAME: &str = "GetSingleTransaction";
pub const GET_SINGLE_TRANSACTION: &str = r"query GetSingleTransaction($hash: String!) {
  getTransaction(hash: $hash) {
    gasLimit
    gasPrice
    to
    from
    value
    data
    chainId
    hash
  }
}";

pub const SAVE_TRANSACTION_NAME: &str = "SaveTransaction";
pub const SAVE_TRANSACTION: &str = r"mutation SaveTransaction($transaction: TransactionInput!) {
  addTransaction(transaction: $transaction) {
    hash
  }
}";
