use crate::domain::{MemberId, MembershipCategory, Role};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員ディレクトリポート
///
/// 貸出コンテキストと会員コンテキストの境界を維持する。
/// 貸出コンテキストは会員種別とロールのみを参照する。
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// 会員種別を取得する
    ///
    /// 会員が存在しない場合は`None`。
    async fn membership_category(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MembershipCategory>>;

    /// ロールを取得する
    ///
    /// API層でのアクセス制御に使用される。
    async fn role(&self, member_id: MemberId) -> Result<Option<Role>>;
}
