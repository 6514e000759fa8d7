use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Username,
    PasswordHash,
    Coins,
}

#[derive(Iden)]
enum Merch {
    Table,
    Id,
    Name,
    Price,
}

#[derive(Iden)]
enum Inventory {
    Table,
    AccountId,
    MerchId,
    Quantity,
}

#[derive(Iden)]
enum CoinTransactions {
    Table,
    Id,
    Sender,
    Recipient,
    Amount,
    CreatedAt,
}

/// Reserved account every purchase is booked against. Inserted first so it
/// receives id 1 on every backend.
const SHOP_ACCOUNT_NAME: &str = "shop";

const MERCH: [(&str, i64); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

fn query_err(err: impl std::fmt::Display) -> DbErr {
    DbErr::Custom(err.to_string())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::PasswordHash).blob().not_null())
                    .col(
                        ColumnDef::new(Accounts::Coins)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Accounts::Coins).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Merch::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Merch::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Merch::Name).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Merch::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Merch::Price).gt(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inventory::AccountId).integer().not_null())
                    .col(ColumnDef::new(Inventory::MerchId).integer().not_null())
                    .col(
                        ColumnDef::new(Inventory::Quantity)
                            .big_integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Inventory::Quantity).gt(0)),
                    )
                    .primary_key(
                        Index::create()
                            .col(Inventory::AccountId)
                            .col(Inventory::MerchId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory-account_id")
                            .from(Inventory::Table, Inventory::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory-merch_id")
                            .from(Inventory::Table, Inventory::MerchId)
                            .to(Merch::Table, Merch::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // No foreign keys on the parties: ledger rows outlive accounts.
        manager
            .create_table(
                Table::create()
                    .table(CoinTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoinTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoinTransactions::Sender).integer().not_null())
                    .col(
                        ColumnDef::new(CoinTransactions::Recipient)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CoinTransactions::Amount)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(CoinTransactions::Amount).gt(0)),
                    )
                    .col(
                        ColumnDef::new(CoinTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-coin_transactions-sender")
                    .table(CoinTransactions::Table)
                    .col(CoinTransactions::Sender)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-coin_transactions-recipient")
                    .table(CoinTransactions::Table)
                    .col(CoinTransactions::Recipient)
                    .to_owned(),
            )
            .await?;

        let shop = Query::insert()
            .into_table(Accounts::Table)
            .columns([Accounts::Username, Accounts::PasswordHash, Accounts::Coins])
            .values([
                SHOP_ACCOUNT_NAME.into(),
                Vec::<u8>::new().into(),
                0i64.into(),
            ])
            .map_err(query_err)?
            .to_owned();
        manager.exec_stmt(shop).await?;

        let mut merch = Query::insert();
        merch
            .into_table(Merch::Table)
            .columns([Merch::Name, Merch::Price]);
        for (name, price) in MERCH {
            merch
                .values([name.into(), price.into()])
                .map_err(query_err)?;
        }
        manager.exec_stmt(merch).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoinTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inventory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Merch::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}
