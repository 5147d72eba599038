//! 判定監査ログの記録
//!
//! 判定の生成と同一トランザクション内で監査エントリを組み立てて
//! 書き込む。判定が存在して監査ログが無い状態を作らないこと。

mod recorder;

pub use recorder::record;
