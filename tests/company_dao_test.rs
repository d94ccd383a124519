mod common;

use transactional_dao::{Company, CompanyDao, Entity, ProductDao};

use common::{product, sqlite_store};

#[tokio::test]
async fn test_fetch_products_loads_the_whole_aggregate() {
    let uow = sqlite_store().await;
    let companies = CompanyDao::new(uow.clone());
    let products = ProductDao::new(uow.clone());

    let mut mars = Company::new("Mars Inc.");
    companies.save(&mut mars).await.expect("Failed to save company");
    let mars_id = mars.id().expect("id");

    for name in ["Snickers", "Twix"] {
        let mut bar = product(name, 3);
        products.save(&mut bar).await.expect("Failed to save product");
        mars.add_product(bar);
    }
    for bar in mars.products() {
        assert_eq!(bar.company_id(), Some(mars_id));
        products.update(bar).await.expect("Failed to link product");
    }
    products
        .save(&mut product("Unrelated", 1))
        .await
        .expect("Failed to save product");

    let loaded = companies
        .find_by_id_fetch_products(mars_id)
        .await
        .expect("Failed to load company");

    assert_eq!(loaded, mars);
    assert_eq!(loaded.name, "Mars Inc.");
    let names: Vec<_> = loaded.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Snickers", "Twix"]);
    assert!(loaded
        .products()
        .iter()
        .all(|p| p.company_id() == Some(mars_id)));
}

#[tokio::test]
async fn test_company_without_products_has_empty_collection() {
    let companies = CompanyDao::new(sqlite_store().await);
    let mut empty = Company::new("Startup");
    companies.save(&mut empty).await.expect("Failed to save company");

    let loaded = companies
        .find_by_id_fetch_products(empty.id().expect("id"))
        .await
        .expect("Failed to load company");

    assert!(loaded.products().is_empty());
}

#[tokio::test]
async fn test_fetch_products_for_missing_company_is_not_found() {
    let companies = CompanyDao::new(sqlite_store().await);

    let err = companies
        .find_by_id_fetch_products(12)
        .await
        .expect_err("No company has id 12");

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_removed_product_is_unlinked() {
    let uow = sqlite_store().await;
    let companies = CompanyDao::new(uow.clone());
    let products = ProductDao::new(uow.clone());

    let mut mars = Company::new("Mars Inc.");
    companies.save(&mut mars).await.expect("Failed to save company");
    let mut bar = product("Bounty", 2);
    products.save(&mut bar).await.expect("Failed to save product");
    let bar_id = bar.id().expect("id");
    mars.add_product(bar);
    products
        .update(&mars.products()[0])
        .await
        .expect("Failed to link product");

    let unlinked = mars.remove_product(bar_id).expect("Product was attached");
    assert_eq!(unlinked.company_id(), None);
    products.update(&unlinked).await.expect("Failed to unlink product");

    let loaded = companies
        .find_by_id_fetch_products(mars.id().expect("id"))
        .await
        .expect("Failed to load company");
    assert!(loaded.products().is_empty());
}

#[tokio::test]
async fn test_company_with_products_cannot_be_removed() {
    let uow = sqlite_store().await;
    let companies = CompanyDao::new(uow.clone());
    let products = ProductDao::new(uow.clone());

    let mut mars = Company::new("Mars Inc.");
    companies.save(&mut mars).await.expect("Failed to save company");
    let mut bar = product("Milky Way", 2);
    products.save(&mut bar).await.expect("Failed to save product");
    mars.add_product(bar);
    products
        .update(&mars.products()[0])
        .await
        .expect("Failed to link product");

    let err = companies
        .remove(&mars)
        .await
        .expect_err("Products still reference the company");

    assert!(err.is_constraint_violation());
    assert_eq!(companies.count().await.expect("Failed to count"), 1);
}
