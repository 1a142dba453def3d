use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    LoyaltyPoints,
    HasUsedNewUserSpin,
    LastSpinAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    AmountPaid,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ProductName,
    Category,
    Tags,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    Balance,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WalletTransactions {
    Table,
    Id,
    UserId,
    Amount,
    BalanceAfter,
    Reference,
    Gateway,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vouchers {
    Table,
    Id,
    Code,
    DiscountType,
    DiscountValue,
    OwnerUserId,
    MaxUses,
    UsedCount,
    ValidFrom,
    ValidTo,
    IsActive,
    Reference,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LoyaltyPointEvents {
    Table,
    Id,
    UserId,
    Points,
    Reference,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Referrals {
    Table,
    Id,
    ReferrerUserId,
    ReferredUserId,
    Status,
    ReferrerDiscountAmount,
    QualifiedAt,
    ClaimedAt,
    CreatedAt,
}

/// Spin wheel prize configuration (admin managed)
#[derive(DeriveIden)]
enum SpinPrizes {
    Table,
    Id,
    Label,
    SubLabel,
    PrizeType,
    Value,
    Probability,
    LinkedProductId,
    NewUserOnly,
    IsActive,
    Slug,
    Color,
    TextColor,
    SortOrder,
}

#[derive(DeriveIden)]
enum SpinRecords {
    Table,
    Id,
    UserId,
    PrizeId,
    PrizeLabel,
    PrizeType,
    Value,
    Reference,
    VoucherCode,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    UserId,
    ProductId,
    Quantity,
    UnitPrice,
    IsPrize,
    PrizeReference,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at_col<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// Default wheel. Regular odds sum to 1.0; the two welcome prizes are drawn
/// uniformly for first-time spinners and never enter the regular pool.
#[allow(clippy::type_complexity)]
const DEFAULT_PRIZES: &[(&str, &str, &str, i64, f64, Option<i64>, bool)] = &[
    ("₦500 Cash", "Wallet credit", "wallet_cash", 500, 0.15, None, false),
    ("10% Off", "Next order voucher", "voucher_percent", 10, 0.25, None, false),
    ("Free Delivery", "Next order", "free_delivery", 2500, 0.20, None, false),
    ("Mystery Item", "Added to your cart", "item", 0, 0.05, Some(1), false),
    ("Try Again", "Better luck tomorrow", "none", 0, 0.25, None, false),
    ("50 Points", "Loyalty bonus", "loyalty_points", 50, 0.10, None, false),
    ("Welcome 15% Off", "New customers", "voucher_percent", 15, 0.0, None, true),
    ("Welcome ₦1000 Cash", "New customers", "wallet_cash", 1000, 0.0, None, true),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::DisplayName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::LoyaltyPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::HasUsedNewUserSpin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::LastSpinAt).timestamp_with_time_zone().null())
                    .col(&mut created_at_col(Users::CreatedAt))
                    .col(&mut created_at_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(&mut id_col(Orders::Id))
                    .col(ColumnDef::new(Orders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::AmountPaid).big_integer().not_null())
                    .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                    .col(&mut created_at_col(Orders::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_user")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(&mut id_col(OrderItems::Id))
                    .col(ColumnDef::new(OrderItems::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::ProductName).string_len(255).not_null())
                    .col(ColumnDef::new(OrderItems::Category).string_len(255).null())
                    .col(ColumnDef::new(OrderItems::Tags).string_len(512).null())
                    .col(ColumnDef::new(OrderItems::Quantity).integer().not_null().default(1))
                    .col(ColumnDef::new(OrderItems::UnitPrice).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 钱包余额：每个用户一行
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(&mut id_col(Wallets::Id))
                    .col(ColumnDef::new(Wallets::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Wallets::Balance).big_integer().not_null().default(0))
                    .col(&mut created_at_col(Wallets::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_wallets_user")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 追加式流水，reference 唯一保证幂等
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(&mut id_col(WalletTransactions::Id))
                    .col(ColumnDef::new(WalletTransactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(WalletTransactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(WalletTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Reference)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletTransactions::Gateway).string_len(64).not_null())
                    .col(ColumnDef::new(WalletTransactions::Description).text().null())
                    .col(&mut created_at_col(WalletTransactions::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_wallet_transactions_reference")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wallet_transactions_user")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(&mut id_col(Vouchers::Id))
                    .col(ColumnDef::new(Vouchers::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Vouchers::DiscountType).string_len(16).not_null())
                    .col(ColumnDef::new(Vouchers::DiscountValue).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::OwnerUserId).big_integer().not_null())
                    .col(ColumnDef::new(Vouchers::MaxUses).integer().not_null().default(1))
                    .col(ColumnDef::new(Vouchers::UsedCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Vouchers::ValidFrom).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Vouchers::ValidTo).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Vouchers::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Vouchers::Reference).string_len(128).null())
                    .col(&mut created_at_col(Vouchers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_vouchers_code")
                    .table(Vouchers::Table)
                    .col(Vouchers::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL reference 不参与唯一约束（手工发放的券）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_vouchers_reference")
                    .table(Vouchers::Table)
                    .col(Vouchers::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyPointEvents::Table)
                    .if_not_exists()
                    .col(&mut id_col(LoyaltyPointEvents::Id))
                    .col(ColumnDef::new(LoyaltyPointEvents::UserId).big_integer().not_null())
                    .col(ColumnDef::new(LoyaltyPointEvents::Points).big_integer().not_null())
                    .col(
                        ColumnDef::new(LoyaltyPointEvents::Reference)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoyaltyPointEvents::Description).text().null())
                    .col(&mut created_at_col(LoyaltyPointEvents::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_loyalty_point_events_reference")
                    .table(LoyaltyPointEvents::Table)
                    .col(LoyaltyPointEvents::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Referrals::Table)
                    .if_not_exists()
                    .col(&mut id_col(Referrals::Id))
                    .col(ColumnDef::new(Referrals::ReferrerUserId).big_integer().not_null())
                    .col(ColumnDef::new(Referrals::ReferredUserId).big_integer().not_null())
                    .col(ColumnDef::new(Referrals::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Referrals::ReferrerDiscountAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Referrals::QualifiedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Referrals::ClaimedAt).timestamp_with_time_zone().null())
                    .col(&mut created_at_col(Referrals::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // 一个用户只能被推荐一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_referrals_referred_user")
                    .table(Referrals::Table)
                    .col(Referrals::ReferredUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SpinPrizes::Table)
                    .if_not_exists()
                    .col(&mut id_col(SpinPrizes::Id))
                    .col(ColumnDef::new(SpinPrizes::Label).string_len(255).not_null())
                    .col(ColumnDef::new(SpinPrizes::SubLabel).string_len(255).null())
                    .col(ColumnDef::new(SpinPrizes::PrizeType).string_len(32).not_null())
                    .col(ColumnDef::new(SpinPrizes::Value).big_integer().null())
                    .col(ColumnDef::new(SpinPrizes::Probability).double().null())
                    .col(ColumnDef::new(SpinPrizes::LinkedProductId).big_integer().null())
                    .col(ColumnDef::new(SpinPrizes::NewUserOnly).boolean().null())
                    .col(ColumnDef::new(SpinPrizes::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(SpinPrizes::Slug).string_len(255).null())
                    .col(ColumnDef::new(SpinPrizes::Color).string_len(16).null())
                    .col(ColumnDef::new(SpinPrizes::TextColor).string_len(16).null())
                    .col(ColumnDef::new(SpinPrizes::SortOrder).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SpinRecords::Table)
                    .if_not_exists()
                    .col(&mut id_col(SpinRecords::Id))
                    .col(ColumnDef::new(SpinRecords::UserId).big_integer().not_null())
                    // NULL 表示系统兜底奖品（未在配置表中）
                    .col(ColumnDef::new(SpinRecords::PrizeId).big_integer().null())
                    .col(ColumnDef::new(SpinRecords::PrizeLabel).string_len(255).not_null())
                    .col(ColumnDef::new(SpinRecords::PrizeType).string_len(32).not_null())
                    .col(ColumnDef::new(SpinRecords::Value).big_integer().not_null().default(0))
                    .col(ColumnDef::new(SpinRecords::Reference).string_len(128).not_null())
                    .col(ColumnDef::new(SpinRecords::VoucherCode).string_len(32).null())
                    .col(ColumnDef::new(SpinRecords::Status).string_len(16).not_null())
                    .col(&mut created_at_col(SpinRecords::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_spin_records_reference")
                    .table(SpinRecords::Table)
                    .col(SpinRecords::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_spin_records_user")
                    .table(SpinRecords::Table)
                    .col(SpinRecords::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(&mut id_col(CartItems::Id))
                    .col(ColumnDef::new(CartItems::UserId).big_integer().not_null())
                    .col(ColumnDef::new(CartItems::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(CartItems::Quantity).integer().not_null().default(1))
                    .col(ColumnDef::new(CartItems::UnitPrice).big_integer().not_null())
                    .col(ColumnDef::new(CartItems::IsPrize).boolean().not_null().default(false))
                    .col(ColumnDef::new(CartItems::PrizeReference).string_len(128).null())
                    .col(&mut created_at_col(CartItems::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_cart_items_prize_reference")
                    .table(CartItems::Table)
                    .col(CartItems::PrizeReference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert()
            .into_table(SpinPrizes::Table)
            .columns([
                SpinPrizes::Label,
                SpinPrizes::SubLabel,
                SpinPrizes::PrizeType,
                SpinPrizes::Value,
                SpinPrizes::Probability,
                SpinPrizes::LinkedProductId,
                SpinPrizes::NewUserOnly,
                SpinPrizes::IsActive,
                SpinPrizes::SortOrder,
            ])
            .to_owned();
        for (idx, (label, sub_label, prize_type, value, probability, product, new_user_only)) in
            DEFAULT_PRIZES.iter().enumerate()
        {
            seed.values_panic([
                (*label).into(),
                (*sub_label).into(),
                (*prize_type).into(),
                (*value).into(),
                (*probability).into(),
                (*product).into(),
                (*new_user_only).into(),
                true.into(),
                (idx as i32).into(),
            ]);
        }
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(CartItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(SpinRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(SpinPrizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Referrals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(LoyaltyPointEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Vouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(WalletTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
