use imagerank_core::{CoreError, EmbeddingError, ImageId, Label, RankerConfig, Strategy};
use ranking_engine::RankingOrchestrator;
use std::collections::HashMap;

fn config(strategy: Strategy) -> RankerConfig {
    let mut config = RankerConfig::default();
    config.ranking.strategy = strategy;
    config.forest.num_trees = 10;
    config.forest.max_depth = 5;
    config.forest.seed = Some(2024);
    config
}

struct Fixture {
    orchestrator: RankingOrchestrator,
    liked: Vec<ImageId>,
    disliked: Vec<ImageId>,
    unlabeled: ImageId,
}

/// Two liked images near the x axis, two disliked near the y axis and one
/// unlabeled image on the diagonal.
fn clustered(strategy: Strategy) -> Fixture {
    let liked = vec![ImageId::new("l1"), ImageId::new("l2")];
    let disliked = vec![ImageId::new("d1"), ImageId::new("d2")];
    let unlabeled = ImageId::new("u");

    let embeddings: HashMap<ImageId, Vec<f32>> = [
        (liked[0].clone(), vec![1.0, 0.0]),
        (liked[1].clone(), vec![0.9, 0.1]),
        (disliked[0].clone(), vec![0.0, 1.0]),
        (disliked[1].clone(), vec![0.1, 0.9]),
        (unlabeled.clone(), vec![0.5, 0.5]),
    ]
    .into_iter()
    .collect();

    let mut orchestrator = RankingOrchestrator::new(&config(strategy));
    // Deliberately interleaved so the ordering has work to do.
    orchestrator.set_images(vec![
        disliked[0].clone(),
        unlabeled.clone(),
        liked[0].clone(),
        disliked[1].clone(),
        liked[1].clone(),
    ]);
    orchestrator.insert_embeddings(embeddings);
    for image in &liked {
        orchestrator.toggle_label(image, Label::Liked).unwrap();
    }
    for image in &disliked {
        orchestrator.toggle_label(image, Label::Disliked).unwrap();
    }

    Fixture {
        orchestrator,
        liked,
        disliked,
        unlabeled,
    }
}

#[tokio::test]
async fn test_similarity_places_unlabeled_between_clusters() {
    let mut fixture = clustered(Strategy::Similarity);
    let ranking = fixture.orchestrator.recompute().await.unwrap().clone();

    let unlabeled_pos = ranking.position(&fixture.unlabeled).unwrap();
    for image in &fixture.liked {
        assert!(ranking.position(image).unwrap() < unlabeled_pos);
    }
    for image in &fixture.disliked {
        assert!(ranking.position(image).unwrap() > unlabeled_pos);
    }

    let unlabeled_score = ranking.score(&fixture.unlabeled).unwrap();
    for image in &fixture.liked {
        assert!(ranking.score(image).unwrap() > unlabeled_score);
    }
    for image in &fixture.disliked {
        assert!(ranking.score(image).unwrap() < unlabeled_score);
    }
}

#[tokio::test]
async fn test_learned_strategy_trains_and_scores() {
    let mut fixture = clustered(Strategy::Learned);
    let near_liked = ImageId::new("near_liked");
    let near_disliked = ImageId::new("near_disliked");

    let mut images = fixture.liked.clone();
    images.extend(fixture.disliked.iter().cloned());
    images.push(fixture.unlabeled.clone());
    images.push(near_disliked.clone());
    images.push(near_liked.clone());
    fixture.orchestrator.set_images(images);
    fixture.orchestrator.insert_embeddings(
        [
            (near_liked.clone(), vec![0.95, 0.05]),
            (near_disliked.clone(), vec![0.05, 0.95]),
        ]
        .into_iter()
        .collect(),
    );

    let ranking = fixture.orchestrator.recompute().await.unwrap().clone();
    assert!(fixture.orchestrator.forest_version().is_some());

    let liked_score = ranking.score(&near_liked).unwrap();
    let disliked_score = ranking.score(&near_disliked).unwrap();
    assert!((0.0..=1.0).contains(&liked_score));
    assert!(liked_score > disliked_score);
    assert!(ranking.position(&near_liked).unwrap() < ranking.position(&near_disliked).unwrap());
}

#[tokio::test]
async fn test_unchanged_inputs_do_not_retrain() {
    let mut fixture = clustered(Strategy::Learned);

    fixture.orchestrator.recompute().await.unwrap();
    let first = fixture.orchestrator.forest_version();
    fixture.orchestrator.recompute().await.unwrap();
    assert_eq!(fixture.orchestrator.forest_version(), first);

    // Strategy round trip changes the ranking inputs but not the training set.
    fixture.orchestrator.set_strategy(Strategy::Similarity);
    fixture.orchestrator.recompute().await.unwrap();
    fixture.orchestrator.set_strategy(Strategy::Learned);
    fixture.orchestrator.recompute().await.unwrap();
    assert_eq!(fixture.orchestrator.forest_version(), first);

    fixture
        .orchestrator
        .toggle_label(&fixture.unlabeled, Label::Liked)
        .unwrap();
    fixture.orchestrator.recompute().await.unwrap();
    assert!(fixture.orchestrator.forest_version() > first);
}

#[tokio::test]
async fn test_missing_labeled_embedding_keeps_previous_ranking() {
    let mut fixture = clustered(Strategy::Learned);
    let before = fixture.orchestrator.recompute().await.unwrap().clone();
    let version = fixture.orchestrator.forest_version();

    let pending = ImageId::new("pending");
    let mut images: Vec<ImageId> = before.order().into_iter().cloned().collect();
    images.push(pending.clone());
    fixture.orchestrator.set_images(images);
    fixture
        .orchestrator
        .toggle_label(&pending, Label::Liked)
        .unwrap();

    let during = fixture.orchestrator.recompute().await.unwrap().clone();
    assert_eq!(during, before);
    assert_eq!(fixture.orchestrator.forest_version(), version);

    fixture
        .orchestrator
        .insert_embeddings([(pending.clone(), vec![0.8, 0.2])].into_iter().collect());
    let after = fixture.orchestrator.recompute().await.unwrap().clone();
    assert_eq!(after.len(), 6);
    assert!(fixture.orchestrator.forest_version() > version);
}

#[tokio::test]
async fn test_clearing_all_labels_keeps_the_trained_forest() {
    let mut fixture = clustered(Strategy::Learned);
    fixture.orchestrator.recompute().await.unwrap();
    let version = fixture.orchestrator.forest_version();
    assert!(version.is_some());

    for image in &fixture.liked {
        fixture.orchestrator.toggle_label(image, Label::Liked).unwrap();
    }
    for image in &fixture.disliked {
        fixture
            .orchestrator
            .toggle_label(image, Label::Disliked)
            .unwrap();
    }

    let ranking = fixture.orchestrator.recompute().await.unwrap().clone();
    assert_eq!(fixture.orchestrator.forest_version(), version);
    assert_eq!(ranking.len(), 5);
    assert!(ranking
        .entries()
        .iter()
        .all(|entry| entry.label == Label::Unlabeled && entry.score.is_some()));
    assert!(ranking.score(&fixture.liked[0]).unwrap() > ranking.score(&fixture.disliked[0]).unwrap());
}

#[tokio::test]
async fn test_first_ranking_waits_without_dropping_images() {
    let a = ImageId::new("a");
    let b = ImageId::new("b");
    let mut orchestrator = RankingOrchestrator::new(&config(Strategy::Learned));
    orchestrator.set_images(vec![b.clone(), a.clone()]);
    orchestrator.insert_embeddings([(b.clone(), vec![0.0, 1.0])].into_iter().collect());
    orchestrator.toggle_label(&a, Label::Liked).unwrap();

    let ranking = orchestrator.recompute().await.unwrap();
    assert_eq!(ranking.order(), vec![&a, &b]);
    assert!(ranking.entries().iter().all(|entry| entry.score.is_none()));
    assert_eq!(orchestrator.forest_version(), None);

    orchestrator.insert_embeddings([(a.clone(), vec![1.0, 0.0])].into_iter().collect());
    let ranking = orchestrator.recompute().await.unwrap();
    assert!(ranking.entries().iter().all(|entry| entry.score.is_some()));
    assert!(orchestrator.forest_version().is_some());
}

#[tokio::test]
async fn test_learned_without_labels_leaves_everything_unscored() {
    let images: Vec<ImageId> = ["a", "b", "c"].into_iter().map(ImageId::new).collect();
    let mut orchestrator = RankingOrchestrator::new(&config(Strategy::Learned));
    orchestrator.set_images(images.clone());
    orchestrator.insert_embeddings(
        images
            .iter()
            .map(|image| (image.clone(), vec![1.0, 2.0]))
            .collect(),
    );

    let ranking = orchestrator.recompute().await.unwrap();
    assert!(ranking.entries().iter().all(|entry| entry.score.is_none()));
    assert_eq!(ranking.order(), images.iter().collect::<Vec<_>>());
    assert_eq!(orchestrator.forest_version(), None);
}

#[tokio::test]
async fn test_unscored_images_sink_and_keep_their_order() {
    let liked = ImageId::new("liked");
    let scored = ImageId::new("scored");
    let pending_a = ImageId::new("pending_a");
    let pending_b = ImageId::new("pending_b");

    let mut orchestrator = RankingOrchestrator::new(&config(Strategy::Similarity));
    orchestrator.set_images(vec![
        pending_a.clone(),
        scored.clone(),
        pending_b.clone(),
        liked.clone(),
    ]);
    orchestrator.insert_embeddings(
        [
            (liked.clone(), vec![1.0, 0.0]),
            (scored.clone(), vec![0.0, 1.0]),
        ]
        .into_iter()
        .collect(),
    );
    orchestrator.toggle_label(&liked, Label::Liked).unwrap();

    let ranking = orchestrator.recompute().await.unwrap();
    assert_eq!(
        ranking.order(),
        vec![&liked, &scored, &pending_a, &pending_b]
    );
    assert_eq!(ranking.score(&pending_a), None);
}

#[tokio::test]
async fn test_dimension_mismatch_is_surfaced() {
    let a = ImageId::new("a");
    let b = ImageId::new("b");
    let mut orchestrator = RankingOrchestrator::new(&config(Strategy::Similarity));
    orchestrator.set_images(vec![a.clone(), b.clone()]);
    orchestrator.insert_embeddings(
        [(a.clone(), vec![1.0, 0.0]), (b.clone(), vec![1.0, 0.0, 0.0])]
            .into_iter()
            .collect(),
    );
    orchestrator.toggle_label(&a, Label::Liked).unwrap();

    let result = orchestrator.recompute().await;
    assert!(matches!(
        result,
        Err(CoreError::Embedding(EmbeddingError::DimensionMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_labels_follow_image_set() {
    let a = ImageId::new("a");
    let b = ImageId::new("b");
    let mut orchestrator = RankingOrchestrator::new(&config(Strategy::Similarity));
    orchestrator.set_images(vec![a.clone(), b.clone()]);
    orchestrator.toggle_label(&a, Label::Disliked).unwrap();

    orchestrator.set_images(vec![b.clone()]);
    assert_eq!(orchestrator.label(&a), Label::Unlabeled);
    assert!(matches!(
        orchestrator.toggle_label(&a, Label::Liked),
        Err(CoreError::NotFound { .. })
    ));
}
