#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tax_receipt_server::run().await
}
