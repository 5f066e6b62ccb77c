// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ApiOutcome, ApiRequest, DraftMode, FormDraft, FormErrors, FormField, Item, ItemId,
    RequestKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    pub mode: DraftMode,
    pub draft: FormDraft,
    pub errors: FormErrors,
    generation: u64,
}

impl ModalState {
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A failed network call, shown until dismissed or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub request: RequestKind,
    pub message: String,
}

impl Notice {
    pub fn text(&self) -> String {
        format!("{} failed: {}", self.request.as_str(), self.message)
    }
}

/// View controller state: list cache, modal draft, delete gate and flags.
///
/// `dispatch` never performs I/O. Network work is requested through
/// [`AppEvent::RequestIssued`] and its result fed back with
/// [`AppCommand::ApplyOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryState {
    pub items: Vec<Item>,
    pub loading: bool,
    pub modal: Option<ModalState>,
    pub pending_delete: Option<ItemId>,
    pub notice: Option<Notice>,
    pub status_line: Option<String>,
    submitting: Option<u64>,
    next_generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Refresh,
    OpenCreate,
    OpenEdit(Item),
    CloseModal,
    SetDraftField(FormField, String),
    Submit,
    RequestDelete(ItemId),
    ConfirmDelete,
    CancelDelete,
    ApplyOutcome(ApiOutcome),
    DismissNotice,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RequestIssued(ApiRequest),
    ModalOpened(DraftMode),
    ModalClosed,
    DraftChanged(FormField),
    ValidationFailed(FormErrors),
    DeleteConfirmationRequested(ItemId),
    DeleteCancelled,
    ListReplaced(usize),
    NoticeRaised(Notice),
    NoticeDismissed,
    StatusUpdated(String),
    StatusCleared,
}

impl InventoryState {
    pub const fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Refresh => self.refresh(),
            AppCommand::OpenCreate => self.open_modal(DraftMode::Create, FormDraft::default()),
            AppCommand::OpenEdit(item) => {
                let draft = FormDraft::from_item(&item);
                self.open_modal(DraftMode::Edit(item.id), draft)
            }
            AppCommand::CloseModal => match self.modal.take() {
                Some(_) => vec![AppEvent::ModalClosed],
                None => Vec::new(),
            },
            AppCommand::SetDraftField(field, value) => match self.modal.as_mut() {
                Some(modal) => {
                    modal.draft.set_field(field, value);
                    vec![AppEvent::DraftChanged(field)]
                }
                None => Vec::new(),
            },
            AppCommand::Submit => self.submit(),
            AppCommand::RequestDelete(id) => {
                if self.modal.is_some() {
                    return Vec::new();
                }
                self.pending_delete = Some(id);
                vec![AppEvent::DeleteConfirmationRequested(id)]
            }
            AppCommand::ConfirmDelete => match self.pending_delete.take() {
                Some(id) => vec![AppEvent::RequestIssued(ApiRequest::DeleteItem(id))],
                None => Vec::new(),
            },
            AppCommand::CancelDelete => match self.pending_delete.take() {
                Some(_) => vec![AppEvent::DeleteCancelled],
                None => Vec::new(),
            },
            AppCommand::ApplyOutcome(outcome) => self.apply_outcome(outcome),
            AppCommand::DismissNotice => match self.notice.take() {
                Some(_) => vec![AppEvent::NoticeDismissed],
                None => Vec::new(),
            },
            AppCommand::SetStatus(message) => vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn refresh(&mut self) -> Vec<AppEvent> {
        self.loading = true;
        vec![AppEvent::RequestIssued(ApiRequest::ListItems)]
    }

    fn open_modal(&mut self, mode: DraftMode, draft: FormDraft) -> Vec<AppEvent> {
        self.next_generation = self.next_generation.saturating_add(1);
        self.pending_delete = None;
        self.modal = Some(ModalState {
            mode,
            draft,
            errors: FormErrors::default(),
            generation: self.next_generation,
        });
        vec![AppEvent::ModalOpened(mode)]
    }

    fn submit(&mut self) -> Vec<AppEvent> {
        if self.submitting.is_some() {
            return Vec::new();
        }
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };

        match modal.draft.to_payload() {
            Err(errors) => {
                modal.errors = errors.clone();
                vec![AppEvent::ValidationFailed(errors)]
            }
            Ok(payload) => {
                modal.errors = FormErrors::default();
                self.submitting = Some(modal.generation);
                let request = match modal.mode {
                    DraftMode::Create => ApiRequest::CreateItem(payload),
                    DraftMode::Edit(id) => ApiRequest::UpdateItem(id, payload),
                };
                vec![AppEvent::RequestIssued(request)]
            }
        }
    }

    fn apply_outcome(&mut self, outcome: ApiOutcome) -> Vec<AppEvent> {
        match outcome {
            ApiOutcome::ItemsListed(items) => {
                self.loading = false;
                self.items = items;
                vec![AppEvent::ListReplaced(self.items.len())]
            }
            ApiOutcome::ItemSaved(item) => {
                let mut events = Vec::new();
                let submitted_from = self.submitting.take();
                let same_modal = self
                    .modal
                    .as_ref()
                    .is_some_and(|modal| Some(modal.generation) == submitted_from);
                if same_modal {
                    self.modal = None;
                    events.push(AppEvent::ModalClosed);
                }
                events.push(self.set_status(format!("saved {}", item.name)));
                events.extend(self.refresh());
                events
            }
            ApiOutcome::ItemDeleted(id) => {
                let mut events = vec![self.set_status(format!("item {id} deleted"))];
                events.extend(self.refresh());
                events
            }
            ApiOutcome::Failed { request, error } => {
                let notice = Notice {
                    request,
                    message: error,
                };
                self.notice = Some(notice.clone());
                let mut events = vec![AppEvent::NoticeRaised(notice)];
                match request {
                    RequestKind::List => self.loading = false,
                    RequestKind::Create | RequestKind::Update => self.submitting = None,
                    RequestKind::Delete => events.extend(self.refresh()),
                }
                events
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, InventoryState, Notice};
    use crate::{
        ApiOutcome, ApiRequest, DraftMode, FormDraft, FormErrors, FormField, Item, ItemId,
        ItemPayload, NAME_REQUIRED, QUANTITY_NOT_POSITIVE, RequestKind,
    };

    fn desk() -> Item {
        Item {
            id: ItemId::new(3),
            name: "Desk".to_owned(),
            description: Some("oak".to_owned()),
            quantity: 2,
            location: Some("Office".to_owned()),
            created_at: None,
        }
    }

    fn issued_requests(events: &[AppEvent]) -> Vec<&ApiRequest> {
        events
            .iter()
            .filter_map(|event| match event {
                AppEvent::RequestIssued(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn set(state: &mut InventoryState, field: FormField, value: &str) {
        state.dispatch(AppCommand::SetDraftField(field, value.to_owned()));
    }

    #[test]
    fn refresh_sets_loading_and_replaces_cache_wholesale() {
        let mut state = InventoryState {
            items: vec![desk()],
            ..InventoryState::default()
        };

        let events = state.dispatch(AppCommand::Refresh);
        assert!(state.loading);
        assert_eq!(events, vec![AppEvent::RequestIssued(ApiRequest::ListItems)]);

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::ItemsListed(Vec::new())));
        assert!(!state.loading);
        assert!(state.items.is_empty());
        assert_eq!(events, vec![AppEvent::ListReplaced(0)]);
    }

    #[test]
    fn failed_refresh_keeps_stale_cache_and_raises_notice() {
        let mut state = InventoryState {
            items: vec![desk()],
            ..InventoryState::default()
        };
        state.dispatch(AppCommand::Refresh);

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::Failed {
            request: RequestKind::List,
            error: "cannot reach http://localhost:8000".to_owned(),
        }));
        assert!(!state.loading);
        assert_eq!(state.items, vec![desk()]);
        let notice = state.notice.clone().expect("notice raised");
        assert_eq!(notice.text(), "load failed: cannot reach http://localhost:8000");
        assert_eq!(events, vec![AppEvent::NoticeRaised(notice)]);

        assert_eq!(
            state.dispatch(AppCommand::DismissNotice),
            vec![AppEvent::NoticeDismissed]
        );
        assert_eq!(state.notice, None);
    }

    #[test]
    fn open_create_starts_blank_in_create_mode() {
        let mut state = InventoryState::default();
        let events = state.dispatch(AppCommand::OpenCreate);
        let modal = state.modal.as_ref().expect("modal open");
        assert_eq!(modal.mode, DraftMode::Create);
        assert_eq!(modal.draft, FormDraft::default());
        assert!(modal.errors.is_empty());
        assert_eq!(events, vec![AppEvent::ModalOpened(DraftMode::Create)]);
    }

    #[test]
    fn open_edit_seeds_draft_and_targets_item() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenEdit(desk()));
        let modal = state.modal.as_ref().expect("modal open");
        assert_eq!(modal.mode, DraftMode::Edit(ItemId::new(3)));
        assert_eq!(modal.draft.name, "Desk");
        assert_eq!(modal.draft.description, "oak");
        assert_eq!(modal.draft.quantity, "2");
        assert_eq!(modal.draft.location, "Office");
    }

    #[test]
    fn edit_close_create_leaves_no_residual_fields() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenEdit(desk()));
        assert_eq!(state.dispatch(AppCommand::CloseModal), vec![AppEvent::ModalClosed]);
        assert_eq!(state.modal, None);

        state.dispatch(AppCommand::OpenCreate);
        let modal = state.modal.as_ref().expect("modal open");
        assert_eq!(modal.draft, FormDraft::default());
        assert_eq!(modal.mode, DraftMode::Create);
    }

    #[test]
    fn opening_clears_errors_from_previous_submit() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        state.dispatch(AppCommand::Submit);
        assert!(!state.modal.as_ref().expect("open").errors.is_empty());

        state.dispatch(AppCommand::OpenCreate);
        assert!(state.modal.as_ref().expect("open").errors.is_empty());
    }

    #[test]
    fn blank_name_blocks_submit_without_request() {
        for name in ["", "   ", "\t"] {
            let mut state = InventoryState::default();
            state.dispatch(AppCommand::OpenCreate);
            set(&mut state, FormField::Name, name);
            set(&mut state, FormField::Quantity, "4");

            let events = state.dispatch(AppCommand::Submit);
            assert!(issued_requests(&events).is_empty());
            assert!(!state.is_submitting());
            let modal = state.modal.as_ref().expect("modal stays open");
            assert_eq!(modal.errors.name.as_deref(), Some(NAME_REQUIRED));
        }
    }

    #[test]
    fn non_positive_quantity_blocks_submit_without_request() {
        for quantity in ["0", "-3"] {
            let mut state = InventoryState::default();
            state.dispatch(AppCommand::OpenCreate);
            set(&mut state, FormField::Name, "Chair");
            set(&mut state, FormField::Quantity, quantity);

            let events = state.dispatch(AppCommand::Submit);
            assert!(issued_requests(&events).is_empty());
            let modal = state.modal.as_ref().expect("modal stays open");
            assert_eq!(modal.errors.quantity.as_deref(), Some(QUANTITY_NOT_POSITIVE));
        }
    }

    #[test]
    fn editing_desk_to_zero_quantity_blocks_put() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenEdit(Item {
            description: None,
            location: None,
            ..desk()
        }));
        set(&mut state, FormField::Quantity, "0");

        let events = state.dispatch(AppCommand::Submit);
        let expected = FormErrors {
            name: None,
            quantity: Some(QUANTITY_NOT_POSITIVE.to_owned()),
        };
        assert_eq!(events, vec![AppEvent::ValidationFailed(expected.clone())]);
        assert_eq!(state.modal.as_ref().expect("open").errors, expected);
    }

    #[test]
    fn valid_create_issues_post_then_closes_and_refreshes() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        set(&mut state, FormField::Name, "Chair");
        set(&mut state, FormField::Quantity, "5");
        set(&mut state, FormField::Location, "Room A");

        let events = state.dispatch(AppCommand::Submit);
        assert!(state.is_submitting());
        let payload = ItemPayload {
            name: "Chair".to_owned(),
            description: String::new(),
            quantity: 5,
            location: "Room A".to_owned(),
        };
        assert_eq!(
            events,
            vec![AppEvent::RequestIssued(ApiRequest::CreateItem(payload.clone()))]
        );

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::ItemSaved(Item {
            id: ItemId::new(1),
            name: payload.name.clone(),
            description: Some(String::new()),
            quantity: 5,
            location: Some("Room A".to_owned()),
            created_at: None,
        })));
        assert_eq!(state.modal, None);
        assert!(!state.is_submitting());
        assert!(state.loading);
        assert_eq!(
            events,
            vec![
                AppEvent::ModalClosed,
                AppEvent::StatusUpdated("saved Chair".to_owned()),
                AppEvent::RequestIssued(ApiRequest::ListItems),
            ]
        );

        state.dispatch(AppCommand::OpenCreate);
        assert_eq!(state.modal.as_ref().expect("open").draft, FormDraft::default());
    }

    #[test]
    fn valid_edit_issues_put_with_target_identity() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenEdit(desk()));
        set(&mut state, FormField::Quantity, "7");

        let events = state.dispatch(AppCommand::Submit);
        let requests = issued_requests(&events);
        assert_eq!(requests.len(), 1);
        match requests[0] {
            ApiRequest::UpdateItem(id, payload) => {
                assert_eq!(*id, ItemId::new(3));
                assert_eq!(payload.quantity, 7);
                assert_eq!(payload.name, "Desk");
            }
            other => panic!("expected update request, got {other:?}"),
        }
    }

    #[test]
    fn submit_is_ignored_while_in_flight() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        set(&mut state, FormField::Name, "Chair");
        assert_eq!(issued_requests(&state.dispatch(AppCommand::Submit)).len(), 1);
        assert!(state.dispatch(AppCommand::Submit).is_empty());
    }

    #[test]
    fn failed_save_keeps_modal_and_draft_for_retry() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        set(&mut state, FormField::Name, "Chair");
        state.dispatch(AppCommand::Submit);

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::Failed {
            request: RequestKind::Create,
            error: "server error (500): boom".to_owned(),
        }));
        assert!(!state.is_submitting());
        assert_eq!(state.modal.as_ref().expect("still open").draft.name, "Chair");
        assert_eq!(
            events,
            vec![AppEvent::NoticeRaised(Notice {
                request: RequestKind::Create,
                message: "server error (500): boom".to_owned(),
            })]
        );
        assert_eq!(issued_requests(&state.dispatch(AppCommand::Submit)).len(), 1);
    }

    #[test]
    fn late_save_does_not_close_a_newer_modal() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        set(&mut state, FormField::Name, "Chair");
        state.dispatch(AppCommand::Submit);
        state.dispatch(AppCommand::CloseModal);
        state.dispatch(AppCommand::OpenEdit(desk()));

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::ItemSaved(desk())));
        assert!(!events.contains(&AppEvent::ModalClosed));
        assert_eq!(
            state.modal.as_ref().expect("newer modal stays").mode,
            DraftMode::Edit(ItemId::new(3))
        );
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = InventoryState::default();
        let events = state.dispatch(AppCommand::RequestDelete(ItemId::new(3)));
        assert_eq!(
            events,
            vec![AppEvent::DeleteConfirmationRequested(ItemId::new(3))]
        );
        assert!(issued_requests(&events).is_empty());

        let events = state.dispatch(AppCommand::CancelDelete);
        assert_eq!(events, vec![AppEvent::DeleteCancelled]);
        assert_eq!(state.pending_delete, None);
        assert!(state.dispatch(AppCommand::ConfirmDelete).is_empty());

        state.dispatch(AppCommand::RequestDelete(ItemId::new(3)));
        let events = state.dispatch(AppCommand::ConfirmDelete);
        assert_eq!(
            events,
            vec![AppEvent::RequestIssued(ApiRequest::DeleteItem(ItemId::new(3)))]
        );
    }

    #[test]
    fn delete_refreshes_on_success_and_failure() {
        let mut state = InventoryState::default();
        let events =
            state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::ItemDeleted(ItemId::new(3))));
        assert_eq!(
            issued_requests(&events),
            vec![&ApiRequest::ListItems]
        );

        let events = state.dispatch(AppCommand::ApplyOutcome(ApiOutcome::Failed {
            request: RequestKind::Delete,
            error: "server error (404): Item not found".to_owned(),
        }));
        assert_eq!(
            issued_requests(&events),
            vec![&ApiRequest::ListItems]
        );
        assert!(state.notice.is_some());
    }

    #[test]
    fn delete_request_is_ignored_while_modal_open() {
        let mut state = InventoryState::default();
        state.dispatch(AppCommand::OpenCreate);
        assert!(state.dispatch(AppCommand::RequestDelete(ItemId::new(1))).is_empty());
        assert_eq!(state.pending_delete, None);
    }

    #[test]
    fn draft_edits_without_modal_are_dropped() {
        let mut state = InventoryState::default();
        assert!(
            state
                .dispatch(AppCommand::SetDraftField(FormField::Name, "x".to_owned()))
                .is_empty()
        );
        assert!(state.dispatch(AppCommand::CloseModal).is_empty());
    }
}
