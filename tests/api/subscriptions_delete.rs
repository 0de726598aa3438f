use crate::helpers::TestApp;

#[tokio::test]
async fn delete_removes_the_subscription() {
    // given
    let app = TestApp::spawn().await;
    let kept = app.subscribe("kept@example.com").await;
    let removed = app.subscribe("removed@example.com").await;

    // when
    let response = app.delete_email(&removed["id"]).await;

    // then
    assert_eq!(response.status(), 200);
    assert_eq!(app.get_email(&removed["id"]).await.status(), 404);
    assert_eq!(app.list().await, vec![kept]);
}

#[tokio::test]
async fn deleting_twice_is_not_an_error() {
    // given
    let app = TestApp::spawn().await;
    let created = app.subscribe("imie.nazwisko@example.com").await;
    app.delete_email(&created["id"]).await;

    // when
    let response = app.delete_email(&created["id"]).await;

    // then
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn delete_returns_a_404_for_an_id_never_issued() {
    // given
    let app = TestApp::spawn().await;
    app.subscribe("imie.nazwisko@example.com").await;

    // when
    let response = app.delete_email(2).await;

    // then
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    // given
    let app = TestApp::spawn().await;
    let first = app.subscribe("first@example.com").await;
    app.delete_email(&first["id"]).await;

    // when
    let second = app.subscribe("second@example.com").await;

    // then
    assert_eq!(second["id"], 2);
}
