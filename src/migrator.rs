use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_sales_projections_table::Migration),
            Box::new(m20240101_000002_create_future_projections_table::Migration),
            Box::new(m20240101_000003_create_product_upts_table::Migration),
            Box::new(m20240101_000004_create_buffers_table::Migration),
            Box::new(m20240101_000005_create_daily_buffers_table::Migration),
            Box::new(m20240101_000006_create_adjustment_messages_table::Migration),
            Box::new(m20240101_000007_create_closure_plans_table::Migration),
            Box::new(m20240101_000008_create_instructions_table::Migration),
            Box::new(m20240101_000009_create_truck_items_table::Migration),
            Box::new(m20240101_000010_create_sales_mix_tables::Migration),
            Box::new(m20240101_000011_create_projection_configs_table::Migration),
            Box::new(m20240101_000012_create_users_table::Migration),
            Box::new(m20240101_000013_create_refresh_tokens_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_sales_projections_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_sales_projections_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // One row per weekday, aligned with entities::sales_projection
            manager
                .create_table(
                    Table::create()
                        .table(SalesProjections::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesProjections::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesProjections::Day)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(SalesProjections::Amount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SalesProjections::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesProjections::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SalesProjections {
        Table,
        Id,
        Day,
        Amount,
        UpdatedAt,
    }
}

mod m20240101_000002_create_future_projections_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_future_projections_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FutureProjections::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FutureProjections::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FutureProjections::Date)
                                .date()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(FutureProjections::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FutureProjections::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FutureProjections::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FutureProjections::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FutureProjections {
        Table,
        Id,
        Date,
        Amount,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_product_upts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_product_upts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductUpts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductUpts::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductUpts::ProductName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ProductUpts::Utp).decimal().not_null())
                        .col(
                            ColumnDef::new(ProductUpts::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductUpts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductUpts {
        Table,
        Id,
        ProductName,
        Utp,
        UpdatedAt,
    }
}

mod m20240101_000004_create_buffers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_buffers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Buffers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Buffers::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Buffers::ProductName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Buffers::BufferPrcnt)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Buffers::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Buffers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Buffers {
        Table,
        Id,
        ProductName,
        BufferPrcnt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_daily_buffers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_daily_buffers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DailyBuffers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailyBuffers::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DailyBuffers::Day).string().not_null())
                        .col(
                            ColumnDef::new(DailyBuffers::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DailyBuffers::BufferPrcnt)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DailyBuffers::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One override per (day, product)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_daily_buffers_day_product")
                        .table(DailyBuffers::Table)
                        .col(DailyBuffers::Day)
                        .col(DailyBuffers::ProductName)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailyBuffers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DailyBuffers {
        Table,
        Id,
        Day,
        ProductName,
        BufferPrcnt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_adjustment_messages_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_adjustment_messages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AdjustmentMessages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AdjustmentMessages::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AdjustmentMessages::Day).string().not_null())
                        .col(
                            ColumnDef::new(AdjustmentMessages::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentMessages::Message)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentMessages::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentMessages::CreatedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentMessages::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Active-message reads and the purge worker filter on expiry
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_adjustment_messages_expires_at")
                        .table(AdjustmentMessages::Table)
                        .col(AdjustmentMessages::ExpiresAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AdjustmentMessages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AdjustmentMessages {
        Table,
        Id,
        Day,
        ProductName,
        Message,
        ExpiresAt,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000007_create_closure_plans_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_closure_plans_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ClosurePlans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClosurePlans::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClosurePlans::Date).date().not_null())
                        .col(ColumnDef::new(ClosurePlans::Reason).string().not_null())
                        .col(
                            ColumnDef::new(ClosurePlans::DurationValue)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(ClosurePlans::DurationUnit)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ClosurePlans::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ClosurePlans::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_closure_plans_date")
                        .table(ClosurePlans::Table)
                        .col(ClosurePlans::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_closure_plans_expires_at")
                        .table(ClosurePlans::Table)
                        .col(ClosurePlans::ExpiresAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ClosurePlans::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ClosurePlans {
        Table,
        Id,
        Date,
        Reason,
        DurationValue,
        DurationUnit,
        ExpiresAt,
        CreatedAt,
    }
}

mod m20240101_000008_create_instructions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_instructions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Instructions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Instructions::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Instructions::Day).string().not_null())
                        .col(ColumnDef::new(Instructions::Message).string().not_null())
                        .col(
                            ColumnDef::new(Instructions::Products)
                                .json()
                                .not_null()
                                .default("[]"),
                        )
                        .col(
                            ColumnDef::new(Instructions::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Instructions::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_instructions_day")
                        .table(Instructions::Table)
                        .col(Instructions::Day)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Instructions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Instructions {
        Table,
        Id,
        Day,
        Message,
        Products,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000009_create_truck_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_truck_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TruckItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TruckItems::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TruckItems::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TruckItems::Uom).string().not_null())
                        .col(
                            ColumnDef::new(TruckItems::TotalUnits)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TruckItems::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TruckItems::AssociatedItems)
                                .json()
                                .not_null()
                                .default("[]"),
                        )
                        .col(
                            ColumnDef::new(TruckItems::ParLevels)
                                .json()
                                .not_null()
                                .default("{}"),
                        )
                        .col(ColumnDef::new(TruckItems::StorageArea).string().null())
                        .col(
                            ColumnDef::new(TruckItems::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TruckItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TruckItems::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_truck_items_storage_area")
                        .table(TruckItems::Table)
                        .col(TruckItems::StorageArea)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TruckItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum TruckItems {
        Table,
        Id,
        Description,
        Uom,
        TotalUnits,
        Cost,
        AssociatedItems,
        ParLevels,
        StorageArea,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000010_create_sales_mix_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_sales_mix_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesMixBatches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesMixBatches::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesMixBatches::PeriodSales)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesMixBatches::UploadedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SalesMixRows::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesMixRows::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesMixRows::BatchId).uuid().not_null())
                        .col(ColumnDef::new(SalesMixRows::ItemName).string().not_null())
                        .col(
                            ColumnDef::new(SalesMixRows::QuantitySold)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SalesMixRows::NetSales)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_mix_rows_batch_id")
                                .from(SalesMixRows::Table, SalesMixRows::BatchId)
                                .to(SalesMixBatches::Table, SalesMixBatches::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_mix_rows_batch_id")
                        .table(SalesMixRows::Table)
                        .col(SalesMixRows::BatchId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesMixRows::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SalesMixBatches::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SalesMixBatches {
        Table,
        Id,
        PeriodSales,
        UploadedAt,
    }

    #[derive(DeriveIden)]
    enum SalesMixRows {
        Table,
        Id,
        BatchId,
        ItemName,
        QuantitySold,
        NetSales,
    }
}

mod m20240101_000011_create_projection_configs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000011_create_projection_configs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Single-row table; the service always reads and writes id = 1
            manager
                .create_table(
                    Table::create()
                        .table(ProjectionConfigs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProjectionConfigs::Id)
                                .integer()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectionConfigs::PlanNextWeek)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ProjectionConfigs::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectionConfigs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProjectionConfigs {
        Table,
        Id,
        PlanNextWeek,
        UpdatedAt,
    }
}

mod m20240101_000012_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000012_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::DisplayName).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        DisplayName,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000013_create_refresh_tokens_table {
    use super::m20240101_000012_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000013_create_refresh_tokens_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefreshTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RefreshTokens::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(RefreshTokens::JtiHash)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::ExpiresAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::Revoked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_refresh_tokens_user_id")
                                .from(RefreshTokens::Table, RefreshTokens::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_refresh_tokens_user_id")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_refresh_tokens_expires_at")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::ExpiresAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RefreshTokens {
        Table,
        Id,
        UserId,
        JtiHash,
        CreatedAt,
        ExpiresAt,
        Revoked,
    }
}
