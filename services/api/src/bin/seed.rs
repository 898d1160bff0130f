//! Seeds one demo doctor and one demo patient for local development.

use db::NewUser;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL");

    let db = db::connect(&database_url, 2).await.expect("db");
    db::migrate(&db).await.expect("migrations");

    let doc_email = "doc1@example.com";
    let pat_email = "pat1@example.com";
    let hash = auth::hash_password("password").expect("hash");

    if db::find_user_by_email(&db, doc_email)
        .await
        .expect("query")
        .is_none()
    {
        if db::insert_user(
            &db,
            NewUser {
                email: doc_email,
                password_hash: &hash,
                name: "Dr. Raj",
                role: "doctor",
                specialization: Some("General Physician"),
                ..Default::default()
            },
        )
        .await
        .expect("insert doctor")
        .is_some()
        {
            println!("Doctor created: {doc_email}");
        }
    }

    if db::find_user_by_email(&db, pat_email)
        .await
        .expect("query")
        .is_none()
    {
        if db::insert_user(
            &db,
            NewUser {
                email: pat_email,
                password_hash: &hash,
                name: "Aarti",
                role: "patient",
                ..Default::default()
            },
        )
        .await
        .expect("insert patient")
        .is_some()
        {
            println!("Patient created: {pat_email}");
        }
    }

    db::close(&db).await;
}
