use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_vegetable_sales_table::Migration),
            Box::new(m20240501_000002_create_daily_summaries_table::Migration),
            Box::new(m20240501_000003_create_vegetable_reports_table::Migration),
            Box::new(m20240501_000004_create_report_summaries_table::Migration),
        ]
    }
}

mod m20240501_000001_create_vegetable_sales_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000001_create_vegetable_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VegetableSales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VegetableSales::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VegetableSales::Date).date().not_null())
                        .col(ColumnDef::new(VegetableSales::Vegetable).string_len(100).not_null())
                        .col(ColumnDef::new(VegetableSales::Quantity).double().null())
                        .col(ColumnDef::new(VegetableSales::PurchasePrice).double().null())
                        .col(ColumnDef::new(VegetableSales::SellingPrice).double().null())
                        .to_owned(),
                )
                .await?;

            // One record per vegetable per day
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vegetable_sales_vegetable_date")
                        .table(VegetableSales::Table)
                        .col(VegetableSales::Vegetable)
                        .col(VegetableSales::Date)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vegetable_sales_date")
                        .table(VegetableSales::Table)
                        .col(VegetableSales::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VegetableSales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VegetableSales {
        Table,
        Id,
        Date,
        Vegetable,
        Quantity,
        PurchasePrice,
        SellingPrice,
    }
}

mod m20240501_000002_create_daily_summaries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000002_create_daily_summaries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DailySummaries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DailySummaries::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(DailySummaries::Date)
                                .date()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DailySummaries::TotalPurchasePrice)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(DailySummaries::TotalSellingPrice)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(DailySummaries::TotalProfit)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(DailySummaries::TotalLoss)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DailySummaries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DailySummaries {
        Table,
        Id,
        Date,
        TotalPurchasePrice,
        TotalSellingPrice,
        TotalProfit,
        TotalLoss,
    }
}

mod m20240501_000003_create_vegetable_reports_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000003_create_vegetable_reports_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VegetableReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VegetableReports::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(VegetableReports::Date).date().not_null())
                        .col(
                            ColumnDef::new(VegetableReports::Vegetable)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(VegetableReports::Quantity).double().not_null())
                        .col(
                            ColumnDef::new(VegetableReports::PurchasePrice)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VegetableReports::SellingPrice)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VegetableReports::TotalPurchase)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(VegetableReports::TotalSelling)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VegetableReports::Profit).double().not_null())
                        .col(ColumnDef::new(VegetableReports::Loss).double().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vegetable_reports_date")
                        .table(VegetableReports::Table)
                        .col(VegetableReports::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VegetableReports::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VegetableReports {
        Table,
        Id,
        Date,
        Vegetable,
        Quantity,
        PurchasePrice,
        SellingPrice,
        TotalPurchase,
        TotalSelling,
        Profit,
        Loss,
    }
}

mod m20240501_000004_create_report_summaries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240501_000004_create_report_summaries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ReportSummaries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReportSummaries::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ReportSummaries::Date)
                                .date()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ReportSummaries::TotalPurchase)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(ReportSummaries::TotalSelling)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(ReportSummaries::Profit)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(ReportSummaries::Loss)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReportSummaries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ReportSummaries {
        Table,
        Id,
        Date,
        TotalPurchase,
        TotalSelling,
        Profit,
        Loss,
    }
}
