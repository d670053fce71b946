// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AddressInfo, ApiResult, AuthenticatedActor, BookUpdateResponse, CreateBatchRequest,
    CreateBatchResponse, CreateDistributionRequest, CreateDistributionResponse,
    RecipientInput, RegisterRecipientRequest, Role, create_batch, create_distribution,
    register_recipient,
};
use bookdrive::Inventory;
use bookdrive_audit::Cause;
use bookdrive_domain::{LocationPath, LocationTree};

pub fn create_test_actor(role: Role) -> AuthenticatedActor {
    AuthenticatedActor::new(format!("{}-user", role.as_str().to_lowercase()), role)
}

pub fn create_test_admin() -> AuthenticatedActor {
    create_test_actor(Role::SuperAdmin)
}

pub fn create_test_volunteer() -> AuthenticatedActor {
    create_test_actor(Role::Volunteer)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api_req_1"), String::from("API request"))
}

pub fn create_test_inventory() -> Inventory {
    let mut tree: LocationTree = LocationTree::new();
    tree.merge(&LocationPath::center(
        "Telangana",
        "Hyderabad",
        "Secunderabad",
        "North Center",
    ))
    .unwrap();
    tree.merge(&LocationPath::town("Telangana", "Warangal", "Hanamkonda"))
        .unwrap();
    Inventory::with_locations(tree)
}

pub fn create_test_address() -> AddressInfo {
    AddressInfo {
        state: String::from("Telangana"),
        district: String::from("Hyderabad"),
        town: Some(String::from("Secunderabad")),
        center: Some(String::from("North Center")),
        line: None,
    }
}

pub fn create_test_recipient() -> RecipientInput {
    RecipientInput {
        name: String::from("Ravi Kumar"),
        phone: String::from("9876543210"),
        pssm_id: Some(String::from("PSSM-77")),
        recipient_type: String::from("Center"),
        address: create_test_address(),
    }
}

pub fn create_batch_request(name: &str, total: u32) -> CreateBatchRequest {
    CreateBatchRequest {
        batch_name: String::from(name),
        total_books: total,
        serial_start: String::from("1001"),
        serial_end: format!("{}", 1000 + total),
        printed_date: String::from("2026-02-01"),
    }
}

/// Creates a batch of `total` books numbered from 1001 and returns its id.
pub fn create_test_batch(inventory: &mut Inventory, name: &str, total: u32) -> u64 {
    let result: ApiResult<CreateBatchResponse> = create_batch(
        inventory,
        &create_batch_request(name, total),
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    result.response.batch.batch_id
}

pub fn distribution_request(
    batch_id: Option<u64>,
    first_serial: &str,
    count: u32,
) -> CreateDistributionRequest {
    CreateDistributionRequest {
        recipient: create_test_recipient(),
        batch_id,
        book_serials: Vec::new(),
        first_serial: Some(String::from(first_serial)),
        count: Some(count),
        date: Some(String::from("2026-03-01")),
    }
}

pub fn distribute_books(
    inventory: &mut Inventory,
    batch_id: Option<u64>,
    first_serial: &str,
    count: u32,
) -> CreateDistributionResponse {
    create_distribution(
        inventory,
        &distribution_request(batch_id, first_serial, count),
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap()
    .response
}

pub fn registration_request() -> RegisterRecipientRequest {
    RegisterRecipientRequest {
        name: String::from("Lakshmi Devi"),
        phone: String::from("9123456780"),
        pssm_id: None,
        address: create_test_address(),
    }
}

pub fn register_book(inventory: &mut Inventory, book_id: u64) -> BookUpdateResponse {
    register_recipient(
        inventory,
        book_id,
        &registration_request(),
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap()
    .response
}
