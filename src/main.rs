#[actix_web::main]
async fn main() -> std::io::Result<()> {
    order_pdf_server::run().await
}
